//! Map-related read definitions.
//!
//! A filtered list of [`Listing`]s is rolled up into the
//! country → region → city hierarchy, where each node gets a [`Bucket`] with
//! the number of [`Listing`]s located in it and the [`Coordinates`] to display
//! it at.

use std::{cmp::Ordering, collections::HashMap};

use tracing as log;

use crate::domain::geography::{
    city, country, region, Centroids, City, Coordinates, Country, Region,
};
#[cfg(doc)]
use crate::domain::Listing;

/// Suffix of a [`MapData::country_only`] bucket name.
pub const NO_REGION_SUFFIX: &str = " (no state/region)";

/// Suffix of a [`MapData::region_only`] bucket name.
pub const NO_CITY_SUFFIX: &str = " (no city)";

/// Number of [`Listing`]s sharing the same location.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct LocationCount {
    /// Country of the location.
    pub country: country::Id,

    /// Region of the location, if any.
    pub region: Option<region::Id>,

    /// City of the location, if any.
    pub city: Option<city::Id>,

    /// Number of [`Listing`]s at the location.
    pub count: u64,
}

/// [`LocationCount`]s of a filtered list of [`Listing`]s.
#[derive(Clone, Debug, Default)]
pub struct Counts(pub Vec<LocationCount>);

impl Counts {
    /// Returns the geography [`Nodes`] mentioned by these [`Counts`].
    #[must_use]
    pub fn nodes(&self) -> Nodes {
        let mut nodes = Nodes::default();
        for c in &self.0 {
            nodes.countries.push(c.country);
            nodes.regions.extend(c.region);
            nodes.cities.extend(c.city);
        }
        nodes.normalize();
        nodes
    }

    /// Returns the total number of [`Listing`]s in these [`Counts`].
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().map(|c| c.count).sum()
    }
}

/// Selector of geography nodes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Nodes {
    /// Selected countries.
    pub countries: Vec<country::Id>,

    /// Selected regions.
    pub regions: Vec<region::Id>,

    /// Selected cities.
    pub cities: Vec<city::Id>,
}

impl Nodes {
    /// Sorts the IDs and removes the duplicates.
    pub fn normalize(&mut self) {
        self.countries.sort_unstable();
        self.countries.dedup();
        self.regions.sort_unstable();
        self.regions.dedup();
        self.cities.sort_unstable();
        self.cities.dedup();
    }
}

/// Geography reference data of the selected [`Nodes`].
#[derive(Clone, Debug, Default)]
pub struct Reference {
    /// [`Country`]s by their IDs.
    pub countries: HashMap<country::Id, Country>,

    /// [`Region`]s by their IDs.
    pub regions: HashMap<region::Id, Region>,

    /// [`City`]s by their IDs.
    pub cities: HashMap<city::Id, City>,

    /// Mean [`Coordinates`] of all the [`City`]s with known [`Coordinates`]
    /// in a [`Region`].
    ///
    /// [`Region`]s without such [`City`]s are absent.
    pub region_centers: HashMap<region::Id, Coordinates>,
}

impl Reference {
    /// Resolves the display [`Coordinates`] of a [`Country`].
    ///
    /// Falls back to [`Coordinates::ORIGIN`] if the [`Country`] has no code or
    /// it's missing in the [`Centroids`].
    #[must_use]
    pub fn country_coordinates(
        &self,
        id: country::Id,
        centroids: &Centroids,
    ) -> Coordinates {
        self.countries
            .get(&id)
            .and_then(|c| c.code.as_ref())
            .and_then(|code| centroids.get(code))
            .unwrap_or(Coordinates::ORIGIN)
    }

    /// Resolves the display [`Coordinates`] of a [`Region`].
    ///
    /// Falls back to the [`Coordinates`] of its [`Country`].
    #[must_use]
    pub fn region_coordinates(
        &self,
        region: &Region,
        centroids: &Centroids,
    ) -> Coordinates {
        self.region_centers.get(&region.id).copied().unwrap_or_else(|| {
            self.country_coordinates(region.country, centroids)
        })
    }
}

/// Aggregated [`Listing`]s count of a geography node.
#[derive(Clone, Debug, PartialEq)]
pub struct Bucket<Id> {
    /// ID of the node.
    pub id: Id,

    /// Display name of this [`Bucket`].
    pub name: String,

    /// Number of [`Listing`]s in this [`Bucket`].
    pub count: u64,

    /// [`Coordinates`] to display this [`Bucket`] at.
    pub coordinates: Coordinates,
}

impl<Id: Ord> Bucket<Id> {
    /// Compares [`Bucket`]s by their names, and then by their IDs.
    fn order(a: &Self, b: &Self) -> Ordering {
        a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
    }
}

/// Aggregated map of a filtered list of [`Listing`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapData {
    /// [`Bucket`]s of all the [`Listing`]s by [`Country`].
    pub countries: Vec<Bucket<country::Id>>,

    /// [`Bucket`]s of the [`Listing`]s having a [`Region`].
    pub regions: Vec<Bucket<region::Id>>,

    /// [`Bucket`]s of the [`Listing`]s having a [`City`] with known
    /// [`Coordinates`].
    pub cities: Vec<Bucket<city::Id>>,

    /// [`Bucket`]s of the [`Listing`]s without a [`Region`], by [`Country`].
    pub country_only: Vec<Bucket<country::Id>>,

    /// [`Bucket`]s of the [`Listing`]s having a [`Region`], but no [`City`],
    /// by [`Region`].
    pub region_only: Vec<Bucket<region::Id>>,
}

/// Rolls up the provided [`Counts`] into [`MapData`].
///
/// Nodes missing in the [`Reference`] produce no [`Bucket`]s.
#[must_use]
pub fn aggregate(
    counts: &Counts,
    reference: &Reference,
    centroids: &Centroids,
) -> MapData {
    let mut by_country = HashMap::<country::Id, u64>::new();
    let mut by_region = HashMap::<region::Id, u64>::new();
    let mut by_city = HashMap::<city::Id, u64>::new();
    let mut country_only = HashMap::<country::Id, u64>::new();
    let mut region_only = HashMap::<region::Id, u64>::new();
    for c in &counts.0 {
        *by_country.entry(c.country).or_default() += c.count;
        match (c.region, c.city) {
            (None, _) => {
                *country_only.entry(c.country).or_default() += c.count;
            }
            (Some(region), None) => {
                *by_region.entry(region).or_default() += c.count;
                *region_only.entry(region).or_default() += c.count;
            }
            (Some(region), Some(city)) => {
                *by_region.entry(region).or_default() += c.count;
                *by_city.entry(city).or_default() += c.count;
            }
        }
    }

    let country_bucket = |id: country::Id, count: u64, suffix: &str| {
        let Some(country) = reference.countries.get(&id) else {
            log::warn!("`Country(id: {id})` is missing in the reference");
            return None;
        };
        Some(Bucket {
            id,
            name: format!("{}{suffix}", country.name),
            count,
            coordinates: reference.country_coordinates(id, centroids),
        })
    };
    let region_bucket = |id: region::Id, count: u64, suffix: &str| {
        let Some(region) = reference.regions.get(&id) else {
            log::warn!("`Region(id: {id})` is missing in the reference");
            return None;
        };
        Some(Bucket {
            id,
            name: format!("{}{suffix}", region.name),
            count,
            coordinates: reference.region_coordinates(region, centroids),
        })
    };

    MapData {
        countries: sorted(
            by_country
                .into_iter()
                .filter_map(|(id, n)| country_bucket(id, n, "")),
        ),
        regions: sorted(
            by_region
                .into_iter()
                .filter_map(|(id, n)| region_bucket(id, n, "")),
        ),
        cities: sorted(by_city.into_iter().filter_map(|(id, count)| {
            let city = reference.cities.get(&id)?;
            Some(Bucket {
                id,
                name: city.name.to_string(),
                count,
                coordinates: city.coordinates?,
            })
        })),
        country_only: sorted(
            country_only
                .into_iter()
                .filter_map(|(id, n)| country_bucket(id, n, NO_REGION_SUFFIX)),
        ),
        region_only: sorted(
            region_only
                .into_iter()
                .filter_map(|(id, n)| region_bucket(id, n, NO_CITY_SUFFIX)),
        ),
    }
}

/// Collects the provided [`Bucket`]s in their display order.
fn sorted<Id: Ord>(buckets: impl Iterator<Item = Bucket<Id>>) -> Vec<Bucket<Id>> {
    let mut out = buckets.collect::<Vec<_>>();
    out.sort_by(Bucket::order);
    out
}

/// Merges [`LocationCount`]s of the same location.
///
/// Used by backends that can't group in place.
#[must_use]
pub fn count_locations<I>(locations: I) -> Counts
where
    I: IntoIterator<Item = (country::Id, Option<region::Id>, Option<city::Id>)>,
{
    let mut map = HashMap::<_, u64>::new();
    for loc in locations {
        *map.entry(loc).or_default() += 1;
    }
    Counts(
        map.into_iter()
            .map(|((country, region, city), count)| LocationCount {
                country,
                region,
                city,
                count,
            })
            .collect(),
    )
}
