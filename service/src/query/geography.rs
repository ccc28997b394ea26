//! [`Query`] collection related to the geography reference.

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::geography::{country, region, City, Country, Region},
    infra::{database, Database},
    read::geography::{CitySearch, CountrySearch, NameSearch, RegionSearch},
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries [`Country`]s matching the [`CountrySearch`].
pub type Countries = DatabaseQuery<By<Vec<Country>, CountrySearch>>;

/// Queries [`Region`]s of a [`Country`].
///
/// Nothing matches unless the [`Country`] is specified.
#[derive(Clone, Debug, Default)]
pub struct Regions {
    /// [`Country`] to list the [`Region`]s of.
    pub country: Option<country::Id>,

    /// [`NameSearch`] to apply.
    pub name: NameSearch,
}

impl<Db> Query<Regions> for Service<Db>
where
    Db: Database<
        Select<By<Vec<Region>, RegionSearch>>,
        Ok = Vec<Region>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<Region>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Regions { country, name }: Regions,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(country) = country else {
            return Ok(vec![]);
        };
        self.database()
            .execute(Select(By::new(RegionSearch { country, name })))
            .await
            .map_err(tracerr::wrap!())
    }
}

/// Queries [`City`]s of a [`Region`].
///
/// Nothing matches unless the [`Region`] is specified.
#[derive(Clone, Debug, Default)]
pub struct Cities {
    /// [`Region`] to list the [`City`]s of.
    pub region: Option<region::Id>,

    /// [`NameSearch`] to apply.
    pub name: NameSearch,
}

impl<Db> Query<Cities> for Service<Db>
where
    Db: Database<
        Select<By<Vec<City>, CitySearch>>,
        Ok = Vec<City>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Vec<City>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Cities { region, name }: Cities,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(region) = region else {
            return Ok(vec![]);
        };
        self.database()
            .execute(Select(By::new(CitySearch { region, name })))
            .await
            .map_err(tracerr::wrap!())
    }
}
