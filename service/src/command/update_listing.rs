//! [`Command`] for updating an existing [`Listing`].

use common::{
    operations::{By, Commit, Lock, Select, Transact, Transacted, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::Config;
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

use super::{attributes, Attributes, Command};

/// [`Command`] for updating an existing [`Listing`].
///
/// The [`listing::Slug`] is reassigned only if the [`listing::Name`] changes.
#[derive(Clone, Debug)]
pub struct UpdateListing {
    /// ID of the [`Listing`] to update.
    pub id: listing::Id,

    /// New [`Attributes`] of the [`Listing`].
    pub attributes: Attributes,
}

impl<Db> Command<UpdateListing> for Service<Db>
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
            Lock<By<Listing, listing::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Listing>, listing::Id>>,
            Ok = Option<Listing>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<TakenSlugs, SiblingsOf>>,
            Ok = TakenSlugs,
            Err = Traced<database::Error>,
        > + Database<Update<Listing>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Listing;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: UpdateListing) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateListing { id, attributes } = cmd;

        attributes
            .validate::<_, E>(self.database())
            .await
            .map_err(tracerr::wrap!())?;

        let base = slug::Base::from_name(&attributes.name);
        for attempt in 1..=self.config().slug_retries.max(1) {
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

            if listing.name != attributes.name {
                let TakenSlugs(taken) = tx
                    .execute(Select(By::new(SiblingsOf {
                        base: base.clone(),
                        except: Some(id),
                    })))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
                listing.slug = slug::assign(&base, &taken);
            }
            attributes.clone().write_to(&mut listing);
            listing.updated_at = DateTime::now().coerce();

            match tx.execute(Update(listing.clone())).await {
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

/// Error of [`UpdateListing`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Attributes`] are inconsistent.
    #[display("Invalid attributes: {_0}")]
    Invalid(attributes::Invalid),

    /// [`Listing`] doesn't exist.
    #[display("`Listing(id: {_0})` does not exist")]
    #[from(ignore)]
    ListingNotExists(#[error(not(source))] listing::Id),

    /// No free [`listing::Slug`] was found within [`Config::slug_retries`]
    /// attempts.
    #[display("No free slug for `{_0}` base")]
    #[from(ignore)]
    SlugConflict(#[error(not(source))] slug::Base),
}
