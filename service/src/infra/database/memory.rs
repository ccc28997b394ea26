//! In-process [`Database`] implementation.
//!
//! Keeps everything in memory, so suits tests and local demos only.
//! Transactions aren't isolated: writes are visible immediately, and
//! [`Commit`] does nothing.

use std::{collections::HashMap, hash::Hash, sync::Arc};

use common::{
    operations::{By, Commit, Insert, Lock, Select, Transact, Update},
    pagination::Page,
};
use derive_more::{Display, Error as StdError};
use tokio::sync::RwLock;
use tracerr::Traced;

use crate::{
    domain::{
        geography::{
            city, country, region, City, Coordinates, Country, Region,
        },
        listing::{self, Schedule},
        Listing,
    },
    infra::{database, Database},
    read::{
        geography::{CitySearch, CountrySearch, RegionSearch},
        listing::{filter, list, FilterCriteria, SiblingsOf, TakenSlugs},
        map,
    },
};

/// In-process [`Database`].
///
/// Clones share the same data.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Data of this [`Memory`] database.
    state: Arc<RwLock<State>>,
}

/// Data of a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`Listing`]s, including deleted ones.
    listings: HashMap<listing::Id, Listing>,

    /// Stored [`Schedule`]s of [`Listing`]s.
    schedules: HashMap<listing::Id, Schedule>,

    /// Stored [`Country`]s.
    countries: HashMap<country::Id, Country>,

    /// Stored [`Region`]s.
    regions: HashMap<region::Id, Region>,

    /// Stored [`City`]s.
    cities: HashMap<city::Id, City>,
}

impl State {
    /// Returns the active [`Listing`]s matching the provided
    /// [`FilterCriteria`], in list order.
    fn filtered(&self, criteria: &FilterCriteria) -> Vec<Listing> {
        let mut out = self
            .listings
            .values()
            .filter(|l| criteria.matches(l))
            .cloned()
            .collect::<Vec<_>>();
        out.sort_by(filter::order);
        out
    }

    /// Stores the provided [`Listing`], unless its [`listing::Slug`] is
    /// occupied by another active [`Listing`].
    fn store(&mut self, listing: Listing) -> Result<(), Error> {
        let occupied = !listing.is_deleted()
            && self.listings.values().any(|l| {
                l.id != listing.id && !l.is_deleted() && l.slug == listing.slug
            });
        if occupied {
            return Err(Error::UniqueViolation(
                database::ACTIVE_SLUG_CONSTRAINT,
            ));
        }
        drop(self.listings.insert(listing.id, listing));
        Ok(())
    }
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the provided [`Country`] to the geography reference.
    pub async fn add_country(&self, country: Country) {
        drop(self.state.write().await.countries.insert(country.id, country));
    }

    /// Adds the provided [`Region`] to the geography reference.
    pub async fn add_region(&self, region: Region) {
        drop(self.state.write().await.regions.insert(region.id, region));
    }

    /// Adds the provided [`City`] to the geography reference.
    pub async fn add_city(&self, city: City) {
        drop(self.state.write().await.cities.insert(city.id, city));
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Unique constraint is violated.
    #[display("Unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation(c) => constraint.map_or(true, |x| x == *c),
        }
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Listing, listing::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Listing, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Insert<Listing>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(listing): Insert<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state
            .write()
            .await
            .store(listing)
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Database<Update<Listing>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(listing): Update<Listing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.state
            .write()
            .await
            .store(listing)
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Database<Select<By<Option<Listing>, listing::Id>>> for Memory {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self
            .state
            .read()
            .await
            .listings
            .get(by.inner())
            .filter(|l| !l.is_deleted())
            .cloned())
    }
}

impl Database<Select<By<Option<Listing>, listing::Slug>>> for Memory {
    type Ok = Option<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Listing>, listing::Slug>>,
    ) -> Result<Self::Ok, Self::Err> {
        let slug = by.into_inner();
        Ok(self
            .state
            .read()
            .await
            .listings
            .values()
            .find(|l| !l.is_deleted() && l.slug == slug)
            .cloned())
    }
}

impl Database<Select<By<Schedule, listing::Id>>> for Memory {
    type Ok = Schedule;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Schedule, listing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .state
            .read()
            .await
            .schedules
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Schedule::empty(id)))
    }
}

impl Database<Update<Schedule>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(schedule): Update<Schedule>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.state
                .write()
                .await
                .schedules
                .insert(schedule.listing, schedule),
        );
        Ok(())
    }
}

impl Database<Select<By<TakenSlugs, SiblingsOf>>> for Memory {
    type Ok = TakenSlugs;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<TakenSlugs, SiblingsOf>>,
    ) -> Result<Self::Ok, Self::Err> {
        let SiblingsOf { base, except } = by.into_inner();
        let base: &str = base.as_ref();

        let is_sibling = |slug: &str| {
            slug == base
                || slug
                    .strip_prefix(base)
                    .and_then(|s| s.strip_prefix('-'))
                    .is_some_and(|n| {
                        !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit())
                    })
        };
        Ok(TakenSlugs(
            self.state
                .read()
                .await
                .listings
                .values()
                .filter(|l| {
                    !l.is_deleted()
                        && Some(l.id) != except
                        && is_sibling(l.slug.as_ref())
                })
                .map(|l| l.slug.clone())
                .collect(),
        ))
    }
}

impl Database<Select<By<list::Page, list::Selector>>> for Memory {
    type Ok = list::Page;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<list::Page, list::Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let list::Selector { arguments, filter } = by.into_inner();

        let all = self.state.read().await.filtered(&filter);
        let total = all.len();
        Ok(Page {
            items: all
                .into_iter()
                .skip(arguments.offset(total))
                .take(arguments.per_page())
                .collect(),
            number: arguments.number(total),
            per_page: arguments.per_page(),
            total,
        })
    }
}

impl Database<Select<By<Vec<Listing>, FilterCriteria>>> for Memory {
    type Ok = Vec<Listing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Listing>, FilterCriteria>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state.read().await.filtered(by.inner()))
    }
}

impl Database<Select<By<map::Counts, FilterCriteria>>> for Memory {
    type Ok = map::Counts;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<map::Counts, FilterCriteria>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(map::count_locations(
            self.state
                .read()
                .await
                .filtered(by.inner())
                .into_iter()
                .map(|l| (l.country, l.region, l.city)),
        ))
    }
}

impl Database<Select<By<map::Reference, map::Nodes>>> for Memory {
    type Ok = map::Reference;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<map::Reference, map::Nodes>>,
    ) -> Result<Self::Ok, Self::Err> {
        let nodes = by.into_inner();
        let state = self.state.read().await;

        let region_centers = nodes
            .regions
            .iter()
            .filter_map(|id| {
                Coordinates::mean(
                    state
                        .cities
                        .values()
                        .filter(|c| c.region == *id)
                        .filter_map(|c| c.coordinates),
                )
                .map(|center| (*id, center))
            })
            .collect();

        Ok(map::Reference {
            countries: pick(&state.countries, &nodes.countries),
            regions: pick(&state.regions, &nodes.regions),
            cities: pick(&state.cities, &nodes.cities),
            region_centers,
        })
    }
}

/// Picks the entries with the provided `ids` out of the `stored` ones.
///
/// Unknown `ids` are skipped.
fn pick<Id, T>(stored: &HashMap<Id, T>, ids: &[Id]) -> HashMap<Id, T>
where
    Id: Copy + Eq + Hash,
    T: Clone,
{
    ids.iter()
        .filter_map(|id| stored.get(id).map(|v| (*id, v.clone())))
        .collect()
}

impl Database<Select<By<Option<Country>, country::Id>>> for Memory {
    type Ok = Option<Country>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Country>, country::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state.read().await.countries.get(by.inner()).cloned())
    }
}

impl Database<Select<By<Option<Region>, region::Id>>> for Memory {
    type Ok = Option<Region>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Region>, region::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state.read().await.regions.get(by.inner()).cloned())
    }
}

impl Database<Select<By<Option<City>, city::Id>>> for Memory {
    type Ok = Option<City>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<City>, city::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state.read().await.cities.get(by.inner()).cloned())
    }
}

/// Sorts geography nodes by their names, then by their IDs.
fn by_name<T, Id: Ord>(
    mut nodes: Vec<T>,
    key: impl Fn(&T) -> (&str, Id),
) -> Vec<T> {
    nodes.sort_by(|a, b| {
        let (a, b) = (key(a), key(b));
        a.0.cmp(b.0).then_with(|| a.1.cmp(&b.1))
    });
    nodes
}

impl Database<Select<By<Vec<Country>, CountrySearch>>> for Memory {
    type Ok = Vec<Country>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Country>, CountrySearch>>,
    ) -> Result<Self::Ok, Self::Err> {
        let CountrySearch { name } = by.into_inner();
        let found = self
            .state
            .read()
            .await
            .countries
            .values()
            .filter(|c| name.matches(c.name.as_ref()))
            .cloned()
            .collect();
        Ok(by_name(found, |c| (c.name.as_ref(), c.id)))
    }
}

impl Database<Select<By<Vec<Region>, RegionSearch>>> for Memory {
    type Ok = Vec<Region>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Region>, RegionSearch>>,
    ) -> Result<Self::Ok, Self::Err> {
        let RegionSearch { country, name } = by.into_inner();
        let found = self
            .state
            .read()
            .await
            .regions
            .values()
            .filter(|r| r.country == country && name.matches(r.name.as_ref()))
            .cloned()
            .collect();
        Ok(by_name(found, |r| (r.name.as_ref(), r.id)))
    }
}

impl Database<Select<By<Vec<City>, CitySearch>>> for Memory {
    type Ok = Vec<City>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<City>, CitySearch>>,
    ) -> Result<Self::Ok, Self::Err> {
        let CitySearch { region, name } = by.into_inner();
        let found = self
            .state
            .read()
            .await
            .cities
            .values()
            .filter(|c| c.region == region && name.matches(c.name.as_ref()))
            .cloned()
            .collect();
        Ok(by_name(found, |c| (c.name.as_ref(), c.id)))
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    //! [`Memory`] fixtures.

    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use common::operations::{
        By, Commit, Insert, Lock, Select, Transact, Update,
    };
    use tracerr::Traced;

    use crate::{
        domain::{
            geography::{
                city, country, region, City, Coordinates, Country, Name,
                Region,
            },
            listing, Listing,
        },
        infra::{database, Database},
        read::listing::{SiblingsOf, TakenSlugs},
        Config, Service,
    };

    use super::{Error, Memory};

    /// United States.
    pub(crate) const US: country::Id = country::Id::new(1);

    /// Canada.
    pub(crate) const CANADA: country::Id = country::Id::new(2);

    /// California, US.
    pub(crate) const CALIFORNIA: region::Id = region::Id::new(10);

    /// Ontario, Canada.
    pub(crate) const ONTARIO: region::Id = region::Id::new(20);

    /// Los Angeles, California.
    pub(crate) const LOS_ANGELES: city::Id = city::Id::new(100);

    /// Toronto, Ontario.
    pub(crate) const TORONTO: city::Id = city::Id::new(200);

    /// Creates a [`Memory`] database with a small geography reference.
    pub(crate) async fn memory() -> Memory {
        let db = Memory::new();
        db.add_country(Country {
            id: US,
            name: Name::new("United States"),
            code: country::Code::new("US"),
        })
        .await;
        db.add_country(Country {
            id: CANADA,
            name: Name::new("Canada"),
            code: country::Code::new("CA"),
        })
        .await;
        db.add_region(Region {
            id: CALIFORNIA,
            name: Name::new("California"),
            country: US,
            coordinates: None,
        })
        .await;
        db.add_region(Region {
            id: ONTARIO,
            name: Name::new("Ontario"),
            country: CANADA,
            coordinates: None,
        })
        .await;
        db.add_city(City {
            id: LOS_ANGELES,
            name: Name::new("Los Angeles"),
            region: CALIFORNIA,
            country: US,
            coordinates: Some(Coordinates {
                latitude: 34.05,
                longitude: -118.24,
            }),
        })
        .await;
        db.add_city(City {
            id: TORONTO,
            name: Name::new("Toronto"),
            region: ONTARIO,
            country: CANADA,
            coordinates: None,
        })
        .await;
        db
    }

    /// Creates a [`Service`] over a [`memory()`] database.
    pub(crate) async fn service() -> Service<Memory> {
        Service::new(Config::default(), memory().await)
    }

    /// Creates a [`Service`] over a [`Contended`] [`memory()`] database.
    pub(crate) async fn contended() -> Service<Contended> {
        Service::new(Config::default(), Contended::new(memory().await))
    }

    /// [`Memory`] database whose [`Listing`] writes lose a race for their
    /// [`listing::Slug`] a configured number of times.
    ///
    /// Clones share the same counters.
    #[derive(Clone, Debug)]
    pub(crate) struct Contended {
        /// Underlying [`Memory`] database.
        inner: Memory,

        /// Number of upcoming [`Listing`] writes to fail.
        conflicts: Arc<AtomicUsize>,

        /// Number of [`Listing`] writes attempted so far.
        attempts: Arc<AtomicUsize>,
    }

    impl Contended {
        /// Wraps the provided [`Memory`] database without any conflicts.
        pub(crate) fn new(inner: Memory) -> Self {
            Self {
                inner,
                conflicts: Arc::default(),
                attempts: Arc::default(),
            }
        }

        /// Makes the next `n` [`Listing`] writes fail and resets the
        /// [`Contended::attempts()`] counter.
        pub(crate) fn conflict(&self, n: usize) {
            self.conflicts.store(n, Ordering::SeqCst);
            self.attempts.store(0, Ordering::SeqCst);
        }

        /// Returns the number of [`Listing`] writes attempted since the last
        /// [`Contended::conflict()`] call.
        pub(crate) fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }

        /// Counts a [`Listing`] write attempt and fails it while conflicts
        /// remain.
        fn attempt(&self) -> Result<(), Traced<database::Error>> {
            _ = self.attempts.fetch_add(1, Ordering::SeqCst);
            let lost = self
                .conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    n.checked_sub(1)
                })
                .is_ok();
            if lost {
                return Err(tracerr::new!(database::Error::from(
                    Error::UniqueViolation(database::ACTIVE_SLUG_CONSTRAINT),
                )));
            }
            Ok(())
        }
    }

    impl Database<Transact> for Contended {
        type Ok = Self;
        type Err = Traced<database::Error>;

        async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
            Ok(self.clone())
        }
    }

    impl Database<Insert<Listing>> for Contended {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            op: Insert<Listing>,
        ) -> Result<Self::Ok, Self::Err> {
            self.attempt()?;
            self.inner.execute(op).await.map_err(tracerr::wrap!())
        }
    }

    impl Database<Update<Listing>> for Contended {
        type Ok = ();
        type Err = Traced<database::Error>;

        async fn execute(
            &self,
            op: Update<Listing>,
        ) -> Result<Self::Ok, Self::Err> {
            self.attempt()?;
            self.inner.execute(op).await.map_err(tracerr::wrap!())
        }
    }

    /// Forwards the provided operations of a [`Contended`] database to its
    /// inner [`Memory`] one.
    macro_rules! forward {
        ($($op:ty),* $(,)?) => {$(
            impl Database<$op> for Contended {
                type Ok = <Memory as Database<$op>>::Ok;
                type Err = Traced<database::Error>;

                async fn execute(
                    &self,
                    op: $op,
                ) -> Result<Self::Ok, Self::Err> {
                    self.inner.execute(op).await.map_err(tracerr::wrap!())
                }
            }
        )*};
    }

    forward!(
        Commit,
        Lock<By<Listing, listing::Id>>,
        Select<By<Option<Listing>, listing::Id>>,
        Select<By<TakenSlugs, SiblingsOf>>,
        Select<By<Option<Country>, country::Id>>,
        Select<By<Option<Region>, region::Id>>,
        Select<By<Option<City>, city::Id>>,
    );
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select, Update},
        DateTime,
    };

    use crate::{
        domain::{
            listing::{fixture, slug, Slug},
            Listing,
        },
        infra::{database, Database as _},
        read::listing::{SiblingsOf, TakenSlugs},
    };

    use super::Memory;

    #[tokio::test]
    async fn rejects_duplicate_active_slugs() {
        let db = Memory::new();
        let first = fixture::listing("Test Game");
        let second = fixture::listing("Test Game");
        db.execute(Insert(first.clone())).await.unwrap();

        let err = db.execute(Insert(second.clone())).await.unwrap_err();
        assert!(err
            .as_ref()
            .is_unique_violation(Some(database::ACTIVE_SLUG_CONSTRAINT)));

        let mut deleted = first;
        deleted.deleted_at = Some(DateTime::now().coerce());
        db.execute(Update(deleted)).await.unwrap();
        db.execute(Insert(second)).await.unwrap();
    }

    #[tokio::test]
    async fn selects_siblings_only() {
        let db = Memory::new();
        let mut own = None;
        for (name, slug) in [
            ("Test Game", "test-game"),
            ("Test Game", "test-game-2"),
            ("Test Game Night", "test-game-night"),
            ("Test Game", "test-game-x1"),
        ] {
            let mut listing = fixture::listing(name);
            listing.slug = Slug::new(slug).unwrap();
            if own.is_none() {
                own = Some(listing.id);
            }
            db.execute(Insert(listing)).await.unwrap();
        }

        let base = slug::Base::slugify("Test Game");
        let TakenSlugs(mut taken) = db
            .execute(Select(By::new(SiblingsOf {
                base: base.clone(),
                except: None,
            })))
            .await
            .unwrap();
        taken.sort();
        let taken = taken.iter().map(AsRef::as_ref).collect::<Vec<&str>>();
        assert_eq!(taken, ["test-game", "test-game-2"]);

        let TakenSlugs(taken) = db
            .execute(Select(By::new(SiblingsOf { base, except: own })))
            .await
            .unwrap();
        assert_eq!(taken.len(), 1);
    }

    #[tokio::test]
    async fn hides_deleted_listings() {
        let db = Memory::new();
        let mut listing = fixture::listing("Gone Game");
        listing.deleted_at = Some(DateTime::now().coerce());
        db.execute(Insert(listing.clone())).await.unwrap();

        let found = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.id)))
            .await
            .unwrap();
        assert!(found.is_none());

        let found = db
            .execute(Select(By::<Option<Listing>, _>::new(listing.slug)))
            .await
            .unwrap();
        assert!(found.is_none());
    }
}
