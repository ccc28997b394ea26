//! [`Command`] for replacing the [`Schedule`] of a [`Listing`].

use std::collections::HashSet;

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        listing::{
            self,
            schedule::{NextDate, Season, SeasonNumber},
            Schedule,
        },
        Listing,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for replacing the [`Schedule`] of a [`Listing`].
#[derive(Clone, Debug)]
pub struct SetSchedule {
    /// ID of the [`Listing`] to schedule.
    pub id: listing::Id,

    /// Played [`Season`]s, in any order.
    pub seasons: Vec<Season>,

    /// Announced dates of the next season.
    pub next_dates: Vec<NextDate>,
}

impl<Db> Command<SetSchedule> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Lock<By<Listing, listing::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Schedule>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Schedule;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: SetSchedule) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SetSchedule {
            id,
            seasons,
            next_dates,
        } = cmd;

        let mut numbers = HashSet::new();
        if let Some(s) = seasons.iter().find(|s| !numbers.insert(s.number)) {
            return Err(tracerr::new!(E::DuplicateSeason(s.number)));
        }
        if let Some(d) = next_dates.iter().find(|d| d.is_reversed()) {
            return Err(tracerr::new!(E::ReversedDates(d.clone())));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Listing`.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut listing = tx
            .execute(Select(By::<Option<Listing>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ListingNotExists(id))
            .map_err(tracerr::wrap!())?;

        let schedule = Schedule::new(id, seasons, next_dates);
        tx.execute(Update(schedule.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        listing.updated_at = DateTime::now().coerce();
        tx.execute(Update(listing))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(schedule)
    }
}

/// Error of [`SetSchedule`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Listing`] doesn't exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// Several [`Season`]s share the same [`SeasonNumber`].
    #[display("Season {_0} is specified more than once")]
    #[from(ignore)]
    DuplicateSeason(#[error(not(source))] SeasonNumber),

    /// [`NextDate`] ends before it starts.
    #[display("Next season dates `{_0}` end before they start")]
    #[from(ignore)]
    ReversedDates(#[error(not(source))] NextDate),
}

#[cfg(test)]
mod spec {
    use time::{Date, Month};

    use crate::{
        command::{Attributes, CreateListing, DeleteListing},
        domain::listing::{
            self,
            schedule::{NextDate, Season, SeasonNumber},
            Format, Name,
        },
        infra::{
            memory::fixture::{self, US},
            Memory,
        },
        query, Command as _, Service,
    };

    use super::{ExecutionError, SetSchedule};

    fn season(number: i16, name: Option<&str>) -> Season {
        Season {
            number: SeasonNumber::new(number).unwrap(),
            name: name.and_then(Name::new),
            link: None,
        }
    }

    fn date(m: Month, d: u8) -> Option<Date> {
        Some(Date::from_calendar_date(2025, m, d).unwrap())
    }

    async fn create(service: &Service<Memory>) -> listing::Id {
        service
            .execute(CreateListing::from(Attributes::new(
                Name::new("Island Games").unwrap(),
                Format::Survivor,
                US,
            )))
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn replaces_schedule() {
        let service = fixture::service().await;
        let id = create(&service).await;

        _ = service
            .execute(SetSchedule {
                id,
                seasons: vec![season(1, None)],
                next_dates: vec![],
            })
            .await
            .unwrap();
        let schedule = service
            .execute(SetSchedule {
                id,
                seasons: vec![season(3, None), season(2, Some("Borneo"))],
                next_dates: vec![NextDate {
                    start: date(Month::April, 28),
                    end: date(Month::May, 2),
                    label: None,
                }],
            })
            .await
            .unwrap();

        let labels =
            schedule.seasons.iter().map(Season::label).collect::<Vec<_>>();
        assert_eq!(labels, ["Borneo", "Season 3"]);

        let stored = service
            .execute(query::listing::Schedule::by(id))
            .await
            .unwrap();
        assert_eq!(stored, schedule);
        assert_eq!(
            stored.next_dates[0].to_string(),
            "April 28 – May 02, 2025",
        );
    }

    #[tokio::test]
    async fn rejects_invalid_schedules() {
        let service = fixture::service().await;
        let id = create(&service).await;

        let err = service
            .execute(SetSchedule {
                id,
                seasons: vec![season(1, None), season(1, Some("Again"))],
                next_dates: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::DuplicateSeason(_)));

        let err = service
            .execute(SetSchedule {
                id,
                seasons: vec![],
                next_dates: vec![NextDate {
                    start: date(Month::May, 2),
                    end: date(Month::April, 28),
                    label: None,
                }],
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::ReversedDates(_)));

        let stored = service
            .execute(query::listing::Schedule::by(id))
            .await
            .unwrap();
        assert!(stored.seasons.is_empty());
        assert!(stored.next_dates.is_empty());
    }

    #[tokio::test]
    async fn requires_existing_listing() {
        let service = fixture::service().await;
        let id = create(&service).await;
        _ = service.execute(DeleteListing::from(id)).await.unwrap();

        let err = service
            .execute(SetSchedule {
                id,
                seasons: vec![season(1, None)],
                next_dates: vec![],
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::ListingNotExists(_)));
    }
}
