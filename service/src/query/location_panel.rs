//! [`Query`] of a location [`Panel`].

use common::operations::{By, Select};
use tracerr::Traced;

#[cfg(doc)]
use crate::Config;
use crate::{
    domain::Listing,
    infra::{database, Database},
    read::{
        listing::FilterCriteria,
        location_panel::{self, Entry, Panel, Selection},
        map,
    },
    Service,
};

use super::Query;

/// Queries the [`Panel`] of the location selected in the [`FilterCriteria`].
///
/// Without a selected location the [`Panel`] is empty.
#[derive(Clone, Debug, Default)]
pub struct LocationPanel {
    /// [`FilterCriteria`] to apply, containing the selected location.
    pub filter: FilterCriteria,
}

impl<Db> Query<LocationPanel> for Service<Db>
where
    Db: Database<
            Select<By<Vec<Listing>, FilterCriteria>>,
            Ok = Vec<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<map::Reference, map::Nodes>>,
            Ok = map::Reference,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Panel;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        LocationPanel { filter }: LocationPanel,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(selection) = Selection::of(&filter) else {
            return Ok(Panel::default());
        };

        let listings = self
            .database()
            .execute(Select(By::<Vec<Listing>, _>::new(filter.clone())))
            .await
            .map_err(tracerr::wrap!())?;

        let mut nodes = map::Nodes::default();
        match selection {
            Selection::City(id) => nodes.cities.push(id),
            Selection::Region { id, .. } => nodes.regions.push(id),
            Selection::Country { id, .. } => nodes.countries.push(id),
        }
        for l in &listings {
            nodes.countries.push(l.country);
            nodes.regions.extend(l.region);
            nodes.cities.extend(l.city);
        }
        nodes.normalize();

        let reference = self
            .database()
            .execute(Select(By::<map::Reference, _>::new(nodes)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Panel {
            label: selection.label(&reference).unwrap_or_default(),
            entries: listings
                .into_iter()
                .map(|l| Entry::new(l, &reference))
                .collect(),
            list_url: location_panel::list_url(
                &self.config().list_path,
                &filter,
            ),
        })
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{Attributes, CreateListing},
        domain::listing::{CollegeName, Format, Name},
        infra::memory::fixture::{self, CALIFORNIA, LOS_ANGELES, US},
        read::listing::FilterCriteria,
        Command as _,
    };

    use super::LocationPanel;

    #[tokio::test]
    async fn is_empty_without_selected_location() {
        let service = fixture::service().await;
        _ = service
            .execute(CreateListing::from(Attributes::new(
                Name::new("Lonely Game").unwrap(),
                Format::TaskMaster,
                US,
            )))
            .await
            .unwrap();

        let panel = service
            .execute(LocationPanel {
                filter: FilterCriteria::from_query([("game_format", "TM")]),
            })
            .await
            .unwrap();

        assert!(panel.entries.is_empty());
        assert!(panel.label.is_empty());
        assert!(panel.list_url.is_empty());
    }

    #[tokio::test]
    async fn lists_listings_of_region_without_city() {
        let service = fixture::service().await;
        for (name, city) in [("Beach Game", None), ("Movie Game", Some(LOS_ANGELES))] {
            let mut attrs =
                Attributes::new(Name::new(name).unwrap(), Format::TaskMaster, US);
            attrs.region = Some(CALIFORNIA);
            attrs.city = city;
            attrs.college_game = Some(false);
            attrs.college_name = None;
            _ = service.execute(CreateListing::from(attrs)).await.unwrap();
        }
        let mut college =
            Attributes::new(Name::new("Campus Game").unwrap(), Format::TheMole, US);
        college.region = Some(CALIFORNIA);
        college.college_game = Some(true);
        college.college_name = CollegeName::new("State U");
        _ = service.execute(CreateListing::from(college)).await.unwrap();

        let panel = service
            .execute(LocationPanel {
                filter: FilterCriteria::from_query([
                    ("region", "10"),
                    ("no_city", "1"),
                ]),
            })
            .await
            .unwrap();

        assert_eq!(panel.label, "California (no city)");
        assert_eq!(panel.list_url, "/games/?region=10&no_city=1");
        let entries = panel
            .entries
            .iter()
            .map(|e| (e.name.to_string(), e.location.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            entries,
            [
                ("Beach Game".to_owned(), "California, US"),
                ("Campus Game".to_owned(), "California, US"),
            ],
        );
        assert_eq!(
            panel.entries[1].college_name.as_ref().map(ToString::to_string),
            Some("State U".to_owned()),
        );

        let panel = service
            .execute(LocationPanel {
                filter: FilterCriteria::from_query([("city", "100")]),
            })
            .await
            .unwrap();
        assert_eq!(panel.label, "Los Angeles");
        assert_eq!(panel.entries.len(), 1);
        assert_eq!(panel.entries[0].location, "Los Angeles, California");
    }
}
