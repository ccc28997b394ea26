//! [`Query`] collection related to a single [`Listing`].

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    domain::{listing, Listing},
    infra::{database, Database},
    read::listing::Detail,
    Service,
};

use super::{DatabaseQuery, Query};

/// Queries an active [`Listing`] by its [`listing::Slug`].
pub type BySlug = DatabaseQuery<By<Option<Listing>, listing::Slug>>;

/// Queries the [`listing::Schedule`] of a [`Listing`] by its ID.
///
/// A [`Listing`] without any seasons or dates has an empty
/// [`listing::Schedule`].
pub type Schedule = DatabaseQuery<By<listing::Schedule, listing::Id>>;

/// Queries the [`Detail`] of an active [`Listing`] by its [`listing::Slug`].
#[derive(Clone, Debug)]
pub struct Details {
    /// [`listing::Slug`] of the [`Listing`].
    pub slug: listing::Slug,
}

impl<Db> Query<Details> for Service<Db>
where
    Db: Database<
            Select<By<Option<Listing>, listing::Slug>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<listing::Schedule, listing::Id>>,
            Ok = listing::Schedule,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Option<Detail>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Details { slug }: Details,
    ) -> Result<Self::Ok, Self::Err> {
        let Some(listing) = self
            .database()
            .execute(Select(By::<Option<Listing>, _>::new(slug)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let schedule = self
            .database()
            .execute(Select(By::<listing::Schedule, _>::new(listing.id)))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Some(Detail { listing, schedule }))
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{Attributes, CreateListing, DeleteListing, SetSchedule},
        domain::listing::{
            schedule::{Season, SeasonNumber},
            Email, Format, Handle, Name, Slug,
        },
        infra::memory::fixture::{self, US},
        Command as _,
    };

    use super::Details;

    #[tokio::test]
    async fn details_listing_with_schedule() {
        let service = fixture::service().await;
        let mut attrs = Attributes::new(
            Name::new("Mole Hunt").unwrap(),
            Format::TheMole,
            US,
        );
        attrs.email = Email::new("host@molehunt.example");
        attrs.instagram_handle = Handle::new("molehunt");
        let created = service
            .execute(CreateListing::from(attrs))
            .await
            .unwrap();

        let detail = service
            .execute(Details {
                slug: created.slug.clone(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.listing.id, created.id);
        assert_eq!(
            detail.listing.email.as_ref().map(AsRef::<str>::as_ref),
            Some("host@molehunt.example"),
        );
        assert!(detail.schedule.seasons.is_empty());

        _ = service
            .execute(SetSchedule {
                id: created.id,
                seasons: vec![Season {
                    number: SeasonNumber::new(1).unwrap(),
                    name: None,
                    link: None,
                }],
                next_dates: vec![],
            })
            .await
            .unwrap();
        let detail = service
            .execute(Details {
                slug: created.slug.clone(),
            })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(detail.schedule.seasons.len(), 1);
        assert_eq!(detail.schedule.listing, created.id);

        _ = service.execute(DeleteListing::from(created.id)).await.unwrap();
        let missing = service
            .execute(Details { slug: created.slug })
            .await
            .unwrap();
        assert!(missing.is_none());

        let unknown = service
            .execute(Details {
                slug: Slug::new("no-such-game").unwrap(),
            })
            .await
            .unwrap();
        assert!(unknown.is_none());
    }
}
