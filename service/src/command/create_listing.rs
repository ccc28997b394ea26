//! [`Command`] for creating a new [`Listing`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        geography::{city, country, region, City, Country, Region},
        listing::{self, slug},
        Listing,
    },
    infra::{database, Database},
    read::listing::{SiblingsOf, TakenSlugs},
    Service,
};
#[cfg(doc)]
use crate::Config;

use super::{attributes, Attributes, Command};

/// [`Command`] for creating a new [`Listing`].
#[derive(Clone, Debug, From)]
pub struct CreateListing {
    /// [`Attributes`] of a new [`Listing`].
    pub attributes: Attributes,
}

impl<Db> Command<CreateListing> for Service<Db>
where
    Db: Database<
            Select<By<Option<Country>, country::Id>>,
            Ok = Option<Country>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Region>, region::Id>>,
            Ok = Option<Region>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<City>, city::Id>>,
            Ok = Option<City>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<TakenSlugs, SiblingsOf>>,
            Ok = TakenSlugs,
            Err = Traced<database::Error>,
        > + Database<Insert<Listing>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateListing) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateListing { attributes } = cmd;

        attributes
            .validate::<_, E>(self.database())
            .await
            .map_err(tracerr::wrap!())?;

        let now = DateTime::now();
        let base = slug::Base::from_name(&attributes.name);
        let mut listing = Listing {
            id: listing::Id::new(),
            // Replaced below, once the taken slugs are known.
            slug: slug::assign(&base, []),
            name: attributes.name.clone(),
            format: attributes.format,
            duration: None,
            filming_status: None,
            active: None,
            for_charity: None,
            friends_and_family: None,
            college_game: None,
            college_name: None,
            country: attributes.country,
            region: None,
            city: None,
            description: None,
            host: None,
            email: None,
            website: None,
            instagram_handle: None,
            facebook_link: None,
            youtube_link: None,
            lrg_wiki_page: None,
            casting_link: None,
            logo: None,
            created_at: now.coerce(),
            updated_at: now.coerce(),
            deleted_at: None,
        };
        attributes.write_to(&mut listing);

        for attempt in 1..=self.config().slug_retries.max(1) {
            let tx = self
                .database()
                .execute(Transact)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;

            let TakenSlugs(taken) = tx
                .execute(Select(By::new(SiblingsOf {
                    base: base.clone(),
                    except: None,
                })))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            listing.slug = slug::assign(&base, &taken);

            match tx.execute(Insert(listing.clone())).await {
                Ok(()) => {}
                Err(e)
                    if e.as_ref().is_unique_violation(Some(
                        database::ACTIVE_SLUG_CONSTRAINT,
                    )) =>
                {
                    log::warn!(
                        "`Slug({})` was taken concurrently, attempt {attempt}",
                        listing.slug,
                    );
                    continue;
                }
                Err(e) => {
                    return Err(e).map_err(tracerr::map_from_and_wrap!(=> E));
                }
            }

            tx.execute(Commit)
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;

            return Ok(listing);
        }

        Err(tracerr::new!(E::SlugConflict(base)))
    }
}

/// Error of [`CreateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Attributes`] are inconsistent.
    #[display("Invalid attributes: {_0}")]
    Invalid(attributes::Invalid),

    /// No free [`listing::Slug`] was found within [`Config::slug_retries`]
    /// attempts.
    #[display("No free slug for `{_0}` base")]
    #[from(ignore)]
    SlugConflict(#[error(not(source))] slug::Base),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{attributes::Invalid, Attributes, DeleteListing},
        domain::listing::{CollegeName, Format, Name},
        infra::memory::fixture::{self, CALIFORNIA, CANADA, LOS_ANGELES, US},
        Command as _,
    };

    use super::{CreateListing, ExecutionError};

    fn attributes(name: &str) -> Attributes {
        Attributes::new(Name::new(name).unwrap(), Format::TheMole, US)
    }

    #[tokio::test]
    async fn numbers_duplicate_slugs() {
        let service = fixture::service().await;

        let first = service
            .execute(CreateListing::from(attributes("Test Game")))
            .await
            .unwrap();
        let second = service
            .execute(CreateListing::from(attributes("Test Game")))
            .await
            .unwrap();
        let third = service
            .execute(CreateListing::from(attributes("test game!")))
            .await
            .unwrap();

        assert_eq!(first.slug.to_string(), "test-game");
        assert_eq!(second.slug.to_string(), "test-game-1");
        assert_eq!(third.slug.to_string(), "test-game-2");
    }

    #[tokio::test]
    async fn gives_up_after_slug_retries() {
        let service = fixture::contended().await;
        service.database().conflict(3);

        let err = service
            .execute(CreateListing::from(attributes("Test Game")))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::SlugConflict(base)
                if base.to_string() == "test-game",
        ));
        assert_eq!(service.database().attempts(), 3);
    }

    #[tokio::test]
    async fn retries_lost_slug_race() {
        let service = fixture::contended().await;
        service.database().conflict(1);

        let created = service
            .execute(CreateListing::from(attributes("Test Game")))
            .await
            .unwrap();

        assert_eq!(created.slug.to_string(), "test-game");
        assert_eq!(service.database().attempts(), 2);
    }

    #[tokio::test]
    async fn reuses_slugs_of_deleted_listings() {
        let service = fixture::service().await;

        let mut created = vec![];
        for _ in 0..3 {
            created.push(
                service
                    .execute(CreateListing::from(attributes("Test Game")))
                    .await
                    .unwrap(),
            );
        }
        _ = service.execute(DeleteListing::from(created[1].id)).await.unwrap();

        let refilled = service
            .execute(CreateListing::from(attributes("Test Game")))
            .await
            .unwrap();
        assert_eq!(refilled.slug.to_string(), "test-game-1");

        _ = service.execute(DeleteListing::from(created[0].id)).await.unwrap();
        let plain = service
            .execute(CreateListing::from(attributes("Test Game")))
            .await
            .unwrap();
        assert_eq!(plain.slug.to_string(), "test-game");
    }

    #[tokio::test]
    async fn stores_location() {
        let service = fixture::service().await;

        let mut attrs = attributes("Mole Hunt");
        attrs.region = Some(CALIFORNIA);
        attrs.city = Some(LOS_ANGELES);
        let listing = service.execute(CreateListing::from(attrs)).await.unwrap();

        assert_eq!(listing.country, US);
        assert_eq!(listing.region, Some(CALIFORNIA));
        assert_eq!(listing.city, Some(LOS_ANGELES));
        assert!(!listing.is_deleted());
    }

    #[tokio::test]
    async fn rejects_inconsistent_locations() {
        let service = fixture::service().await;

        let mut foreign_region = attributes("Mole Hunt");
        foreign_region.country = CANADA;
        foreign_region.region = Some(CALIFORNIA);
        let err = service
            .execute(CreateListing::from(foreign_region))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(Invalid::RegionNotInCountry),
        ));

        let mut orphan_city = attributes("Mole Hunt");
        orphan_city.city = Some(LOS_ANGELES);
        let err = service
            .execute(CreateListing::from(orphan_city))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(Invalid::CityWithoutRegion),
        ));

        let mut college = attributes("Mole Hunt");
        college.college_name = CollegeName::new("State U");
        let err = service
            .execute(CreateListing::from(college))
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::Invalid(Invalid::CollegeNameOfNonCollege),
        ));
    }
}
