//! Geography-related [`Database`] implementations.

use common::operations::{By, Select};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::geography::{
        city, country, region, City, Coordinates, Country, Region,
    },
    infra::{
        database::{
            self,
            postgres::{Connection, LikePattern},
            Postgres,
        },
        Database,
    },
    read::{
        geography::{CitySearch, CountrySearch, NameSearch, RegionSearch},
        map,
    },
};

/// Reads a [`Country`] out of the provided [`Row`].
fn country_from_row(row: &Row) -> Country {
    Country {
        id: row.get("id"),
        name: row.get("name"),
        code: row.get("code"),
    }
}

/// Reads a [`Region`] out of the provided [`Row`].
fn region_from_row(row: &Row) -> Region {
    Region {
        id: row.get("id"),
        name: row.get("name"),
        country: row.get("country_id"),
        coordinates: Coordinates::from_parts(
            row.get("latitude"),
            row.get("longitude"),
        ),
    }
}

/// Reads a [`City`] out of the provided [`Row`].
fn city_from_row(row: &Row) -> City {
    City {
        id: row.get("id"),
        name: row.get("name"),
        region: row.get("region_id"),
        country: row.get("country_id"),
        coordinates: Coordinates::from_parts(
            row.get("latitude"),
            row.get("longitude"),
        ),
    }
}

impl<C> Database<Select<By<Option<Country>, country::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Country>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Country>, country::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: country::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, code \
            FROM countries \
            WHERE id = $1::INT8";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(country_from_row))
    }
}

impl<C> Database<Select<By<Option<Region>, region::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Region>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Region>, region::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: region::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, country_id, latitude, longitude \
            FROM regions \
            WHERE id = $1::INT8";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(region_from_row))
    }
}

impl<C> Database<Select<By<Option<City>, city::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<City>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<City>, city::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // Avoid subtle change for SQL.
        let id: city::Id = by.into_inner();

        const SQL: &str = "\
            SELECT id, name, region_id, country_id, latitude, longitude \
            FROM cities \
            WHERE id = $1::INT8";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(city_from_row))
    }
}

/// Converts the provided [`NameSearch`] into an `ILIKE` pattern.
///
/// A [`NameSearch`] without a term matches any name.
fn name_pattern(search: &NameSearch) -> LikePattern {
    LikePattern::containing(search.term().unwrap_or_default())
}

impl<C> Database<Select<By<Vec<Country>, CountrySearch>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Country>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Country>, CountrySearch>>,
    ) -> Result<Self::Ok, Self::Err> {
        let CountrySearch { name } = by.into_inner();
        let pattern = name_pattern(&name);

        const SQL: &str = "\
            SELECT id, name, code \
            FROM countries \
            WHERE name ILIKE $1::VARCHAR \
            ORDER BY name, id";
        Ok(self
            .query(SQL, &[&pattern])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(country_from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<Region>, RegionSearch>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Region>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Region>, RegionSearch>>,
    ) -> Result<Self::Ok, Self::Err> {
        let RegionSearch { country, name } = by.into_inner();
        let pattern = name_pattern(&name);

        const SQL: &str = "\
            SELECT id, name, country_id, latitude, longitude \
            FROM regions \
            WHERE country_id = $1::INT8 \
              AND name ILIKE $2::VARCHAR \
            ORDER BY name, id";
        Ok(self
            .query(SQL, &[&country, &pattern])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(region_from_row)
            .collect())
    }
}

impl<C> Database<Select<By<Vec<City>, CitySearch>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<City>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<City>, CitySearch>>,
    ) -> Result<Self::Ok, Self::Err> {
        let CitySearch { region, name } = by.into_inner();
        let pattern = name_pattern(&name);

        const SQL: &str = "\
            SELECT id, name, region_id, country_id, latitude, longitude \
            FROM cities \
            WHERE region_id = $1::INT8 \
              AND name ILIKE $2::VARCHAR \
            ORDER BY name, id";
        Ok(self
            .query(SQL, &[&region, &pattern])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(city_from_row)
            .collect())
    }
}

impl<C> Database<Select<By<map::Reference, map::Nodes>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = map::Reference;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<map::Reference, map::Nodes>>,
    ) -> Result<Self::Ok, Self::Err> {
        let map::Nodes {
            countries,
            regions,
            cities,
        } = by.into_inner();

        let mut reference = map::Reference::default();

        if !countries.is_empty() {
            const SQL: &str = "\
                SELECT id, name, code \
                FROM countries \
                WHERE id = ANY($1::INT8[])";
            reference.countries = self
                .query(SQL, &[&countries])
                .await
                .map_err(tracerr::wrap!())?
                .iter()
                .map(|row| {
                    let c = country_from_row(row);
                    (c.id, c)
                })
                .collect();
        }

        if !regions.is_empty() {
            const SQL: &str = "\
                SELECT id, name, country_id, latitude, longitude \
                FROM regions \
                WHERE id = ANY($1::INT8[])";
            reference.regions = self
                .query(SQL, &[&regions])
                .await
                .map_err(tracerr::wrap!())?
                .iter()
                .map(|row| {
                    let r = region_from_row(row);
                    (r.id, r)
                })
                .collect();

            const CENTERS_SQL: &str = "\
                SELECT region_id, \
                       AVG(latitude) AS latitude, \
                       AVG(longitude) AS longitude \
                FROM cities \
                WHERE region_id = ANY($1::INT8[]) \
                  AND latitude IS NOT NULL \
                  AND longitude IS NOT NULL \
                GROUP BY region_id";
            reference.region_centers = self
                .query(CENTERS_SQL, &[&regions])
                .await
                .map_err(tracerr::wrap!())?
                .into_iter()
                .map(|row| {
                    (
                        row.get("region_id"),
                        Coordinates {
                            latitude: row.get("latitude"),
                            longitude: row.get("longitude"),
                        },
                    )
                })
                .collect();
        }

        if !cities.is_empty() {
            const SQL: &str = "\
                SELECT id, name, region_id, country_id, latitude, longitude \
                FROM cities \
                WHERE id = ANY($1::INT8[])";
            reference.cities = self
                .query(SQL, &[&cities])
                .await
                .map_err(tracerr::wrap!())?
                .iter()
                .map(|row| {
                    let c = city_from_row(row);
                    (c.id, c)
                })
                .collect();
        }

        Ok(reference)
    }
}
