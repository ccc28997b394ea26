//! [`Schedule`]-related [`Database`] implementations.

use common::operations::{By, Select, Update};
use tracerr::Traced;

use crate::{
    domain::listing::{
        self,
        schedule::{NextDate, Season},
        Schedule,
    },
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Schedule, listing::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Schedule;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Schedule, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: listing::Id = by.into_inner();

        const SEASONS_SQL: &str = "\
            SELECT number, name, link \
            FROM seasons \
            WHERE listing_id = $1::UUID \
            ORDER BY number";
        let seasons = self
            .query(SEASONS_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Season {
                number: row.get("number"),
                name: row.get("name"),
                link: row.get("link"),
            })
            .collect();

        const DATES_SQL: &str = "\
            SELECT start_date, end_date, label \
            FROM next_season_dates \
            WHERE listing_id = $1::UUID \
            ORDER BY position";
        let next_dates = self
            .query(DATES_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| NextDate {
                start: row.get("start_date"),
                end: row.get("end_date"),
                label: row.get("label"),
            })
            .collect();

        Ok(Schedule::new(id, seasons, next_dates))
    }
}

impl<C> Database<Update<Schedule>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(schedule): Update<Schedule>,
    ) -> Result<Self::Ok, Self::Err> {
        let Schedule {
            listing: id,
            seasons,
            next_dates,
        } = schedule;

        const CLEAR_SEASONS_SQL: &str = "\
            DELETE FROM seasons \
            WHERE listing_id = $1::UUID";
        _ = self
            .exec(CLEAR_SEASONS_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?;

        const CLEAR_DATES_SQL: &str = "\
            DELETE FROM next_season_dates \
            WHERE listing_id = $1::UUID";
        _ = self
            .exec(CLEAR_DATES_SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?;

        const SEASON_SQL: &str = "\
            INSERT INTO seasons (listing_id, number, name, link) \
            VALUES ($1::UUID, $2::INT2, $3::VARCHAR, $4::VARCHAR)";
        for Season { number, name, link } in &seasons {
            _ = self
                .exec(SEASON_SQL, &[&id, number, name, link])
                .await
                .map_err(tracerr::wrap!())?;
        }

        const DATE_SQL: &str = "\
            INSERT INTO next_season_dates \
                (listing_id, position, start_date, end_date, label) \
            VALUES ($1::UUID, $2::INT4, $3::DATE, $4::DATE, $5::VARCHAR)";
        for (position, NextDate { start, end, label }) in
            (0_i32..).zip(&next_dates)
        {
            _ = self
                .exec(DATE_SQL, &[&id, &position, start, end, label])
                .await
                .map_err(tracerr::wrap!())?;
        }

        Ok(())
    }
}
