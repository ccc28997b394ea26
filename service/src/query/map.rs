//! [`Query`] of the [`MapData`] of [`Listing`]s.
//!
//! [`MapData`]: read::MapData

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Listing;
use crate::{
    infra::{database, Database},
    read::{self, listing::FilterCriteria, map},
    Service,
};

use super::Query;

/// Queries the [`read::MapData`] of the [`Listing`]s matching the
/// [`FilterCriteria`].
#[derive(Clone, Debug, Default)]
pub struct MapData {
    /// [`FilterCriteria`] to apply.
    pub filter: FilterCriteria,
}

impl<Db> Query<MapData> for Service<Db>
where
    Db: Database<
            Select<By<map::Counts, FilterCriteria>>,
            Ok = map::Counts,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<map::Reference, map::Nodes>>,
            Ok = map::Reference,
            Err = Traced<database::Error>,
        >,
{
    type Ok = read::MapData;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        MapData { filter }: MapData,
    ) -> Result<Self::Ok, Self::Err> {
        let counts = self
            .database()
            .execute(Select(By::<map::Counts, _>::new(filter)))
            .await
            .map_err(tracerr::wrap!())?;
        if counts.0.is_empty() {
            return Ok(read::MapData::default());
        }

        let reference = self
            .database()
            .execute(Select(By::<map::Reference, _>::new(counts.nodes())))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(map::aggregate(&counts, &reference, self.config().centroids))
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{Attributes, CreateListing},
        domain::listing::{Format, Name},
        infra::memory::fixture::{self, CALIFORNIA, CANADA, LOS_ANGELES, US},
        read::listing::FilterCriteria,
        Command as _,
    };

    use super::MapData;

    #[tokio::test]
    async fn rolls_listings_up_the_hierarchy() {
        let service = fixture::service().await;
        let locations = [
            (US, Some(CALIFORNIA), Some(LOS_ANGELES)),
            (US, Some(CALIFORNIA), Some(LOS_ANGELES)),
            (US, Some(CALIFORNIA), None),
            (US, None, None),
            (CANADA, None, None),
        ];
        for (i, (country, region, city)) in locations.into_iter().enumerate() {
            let mut attrs = Attributes::new(
                Name::new(format!("Game {i}")).unwrap(),
                Format::AmazingRace,
                country,
            );
            attrs.region = region;
            attrs.city = city;
            _ = service.execute(CreateListing::from(attrs)).await.unwrap();
        }

        let map = service.execute(MapData::default()).await.unwrap();

        let countries = map
            .countries
            .iter()
            .map(|b| (b.name.as_str(), b.count))
            .collect::<Vec<_>>();
        assert_eq!(countries, [("Canada", 1), ("United States", 4)]);
        assert_eq!(map.regions.len(), 1);
        assert_eq!(map.regions[0].count, 3);
        assert_eq!(map.cities.len(), 1);
        assert_eq!(map.cities[0].count, 2);
        assert_eq!(map.cities[0].coordinates.latitude, 34.05);
        assert_eq!(map.region_only.len(), 1);
        assert_eq!(map.region_only[0].name, "California (no city)");
        assert_eq!(map.region_only[0].count, 1);
        let country_only = map
            .country_only
            .iter()
            .map(|b| (b.name.as_str(), b.count))
            .collect::<Vec<_>>();
        assert_eq!(
            country_only,
            [
                ("Canada (no state/region)", 1),
                ("United States (no state/region)", 1),
            ],
        );

        let filtered = service
            .execute(MapData {
                filter: FilterCriteria::from_query([("country", "2")]),
            })
            .await
            .unwrap();
        assert_eq!(filtered.countries.len(), 1);
        assert!(filtered.regions.is_empty());
    }

    #[tokio::test]
    async fn is_empty_without_listings() {
        let service = fixture::service().await;

        let map = service.execute(MapData::default()).await.unwrap();

        assert!(map.countries.is_empty());
        assert!(map.country_only.is_empty());
    }
}
