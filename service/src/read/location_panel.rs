//! Location panel read definitions.
//!
//! A location panel shows the [`Listing`]s of a single geography node
//! selected on the map.

use crate::{
    domain::{
        geography::{city, country, region, City, Country, Region},
        listing::{self, Slug},
        Listing,
    },
    read::{
        listing::FilterCriteria,
        map::{Reference, NO_CITY_SUFFIX, NO_REGION_SUFFIX},
    },
};

/// Geography node selected for a location panel.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Selection {
    /// Single city.
    City(city::Id),

    /// Region, optionally narrowed to the [`Listing`]s without a city.
    Region {
        /// ID of the selected region.
        id: region::Id,

        /// Indicator whether only [`Listing`]s without a city are selected.
        no_city: bool,
    },

    /// Country, optionally narrowed to the [`Listing`]s without a region.
    Country {
        /// ID of the selected country.
        id: country::Id,

        /// Indicator whether only [`Listing`]s without a region are selected.
        no_region: bool,
    },
}

impl Selection {
    /// Extracts the most specific [`Selection`] out of the provided
    /// [`FilterCriteria`], if any.
    #[must_use]
    pub fn of(filter: &FilterCriteria) -> Option<Self> {
        if let Some(id) = filter.city {
            return Some(Self::City(id));
        }
        if let Some(id) = filter.region {
            return Some(Self::Region {
                id,
                no_city: filter.no_city,
            });
        }
        filter.country.map(|id| Self::Country {
            id,
            no_region: filter.no_region,
        })
    }

    /// Builds the human-readable label of this [`Selection`].
    ///
    /// Returns [`None`] if the selected node is missing in the [`Reference`].
    #[must_use]
    pub fn label(&self, reference: &Reference) -> Option<String> {
        Some(match *self {
            Self::City(id) => reference.cities.get(&id)?.name.to_string(),
            Self::Region { id, no_city } => {
                let name = &reference.regions.get(&id)?.name;
                if no_city {
                    format!("{name}{NO_CITY_SUFFIX}")
                } else {
                    name.to_string()
                }
            }
            Self::Country { id, no_region } => {
                let name = &reference.countries.get(&id)?.name;
                if no_region {
                    format!("{name}{NO_REGION_SUFFIX}")
                } else {
                    name.to_string()
                }
            }
        })
    }
}

/// [`Listing`] shown in a [`Panel`].
#[derive(Clone, Debug)]
pub struct Entry {
    /// [`listing::Name`] of the [`Listing`].
    pub name: listing::Name,

    /// [`Slug`] of the [`Listing`].
    pub slug: Slug,

    /// Human-readable location of the [`Listing`].
    pub location: String,

    /// [`listing::Logo`] of the [`Listing`], if any.
    pub logo: Option<listing::Logo>,

    /// [`listing::CollegeName`] of the [`Listing`], if it's a college game.
    pub college_name: Option<listing::CollegeName>,
}

impl Entry {
    /// Creates a new [`Entry`] out of the provided [`Listing`].
    #[must_use]
    pub fn new(listing: Listing, reference: &Reference) -> Self {
        let location = location_display(
            reference.countries.get(&listing.country),
            listing.region.and_then(|id| reference.regions.get(&id)),
            listing.city.and_then(|id| reference.cities.get(&id)),
        );
        let college_name = if listing.college_game == Some(true) {
            listing.college_name
        } else {
            None
        };
        Self {
            name: listing.name,
            slug: listing.slug,
            location,
            logo: listing.logo,
            college_name,
        }
    }
}

/// Listings of a single geography node.
#[derive(Clone, Debug, Default)]
pub struct Panel {
    /// [`Entry`]s of the matching [`Listing`]s.
    pub entries: Vec<Entry>,

    /// Human-readable label of the selected node.
    pub label: String,

    /// URL of the list of the same [`Listing`]s.
    pub list_url: String,
}

/// Builds a human-readable location of a [`Listing`].
///
/// A city is shown along with its region, a region along with the code (or,
/// lacking one, the name) of its country, and a country by its name alone.
#[must_use]
pub fn location_display(
    country: Option<&Country>,
    region: Option<&Region>,
    city: Option<&City>,
) -> String {
    match (country, region, city) {
        (_, Some(region), Some(city)) => format!("{}, {}", city.name, region.name),
        (_, None, Some(city)) => city.name.to_string(),
        (Some(country), Some(region), None) => {
            let country = country.code.as_ref().map_or_else(
                || country.name.to_string(),
                ToString::to_string,
            );
            format!("{}, {country}", region.name)
        }
        (None, Some(region), None) => region.name.to_string(),
        (Some(country), None, None) => country.name.to_string(),
        (None, None, None) => String::new(),
    }
}

/// Builds the URL of the list view with the provided [`FilterCriteria`]
/// applied.
#[must_use]
pub fn list_url(list_path: &str, filter: &FilterCriteria) -> String {
    format!("{list_path}?{}", filter.to_query_string())
}

#[cfg(test)]
mod spec {
    use std::collections::HashMap;

    use crate::{
        domain::{
            geography::{city, country, region, City, Country, Name, Region},
            listing::{fixture, CollegeName},
        },
        read::{listing::FilterCriteria, map::Reference},
    };

    use super::{list_url, location_display, Entry, Selection};

    fn us() -> Country {
        Country {
            id: country::Id::new(1),
            name: Name::new("United States"),
            code: country::Code::new("US"),
        }
    }

    fn california() -> Region {
        Region {
            id: region::Id::new(10),
            name: Name::new("California"),
            country: country::Id::new(1),
            coordinates: None,
        }
    }

    fn los_angeles() -> City {
        City {
            id: city::Id::new(100),
            name: Name::new("Los Angeles"),
            region: region::Id::new(10),
            country: country::Id::new(1),
            coordinates: None,
        }
    }

    fn reference() -> Reference {
        Reference {
            countries: HashMap::from([(us().id, us())]),
            regions: HashMap::from([(california().id, california())]),
            cities: HashMap::from([(los_angeles().id, los_angeles())]),
            region_centers: HashMap::new(),
        }
    }

    fn filter(query: &[(&str, &str)]) -> FilterCriteria {
        FilterCriteria::from_query(query.iter().copied())
    }

    #[test]
    fn prefers_most_specific_selection() {
        assert_eq!(
            Selection::of(&filter(&[
                ("country", "1"),
                ("region", "10"),
                ("city", "100"),
            ])),
            Some(Selection::City(city::Id::new(100))),
        );
        assert_eq!(
            Selection::of(&filter(&[("country", "1"), ("region", "10")])),
            Some(Selection::Region {
                id: region::Id::new(10),
                no_city: false,
            }),
        );
        assert_eq!(
            Selection::of(&filter(&[("country", "1"), ("no_region", "1")])),
            Some(Selection::Country {
                id: country::Id::new(1),
                no_region: true,
            }),
        );
        assert_eq!(Selection::of(&filter(&[("q", "mole")])), None);
    }

    #[test]
    fn labels_selection() {
        let r = reference();

        let label = |query: &[(&str, &str)]| {
            Selection::of(&filter(query)).and_then(|s| s.label(&r))
        };

        assert_eq!(label(&[("city", "100")]).unwrap(), "Los Angeles");
        assert_eq!(
            label(&[("region", "10"), ("no_city", "1")]).unwrap(),
            "California (no city)",
        );
        assert_eq!(
            label(&[("country", "1"), ("no_region", "1")]).unwrap(),
            "United States (no state/region)",
        );
        assert_eq!(label(&[("country", "1")]).unwrap(), "United States");
        assert_eq!(label(&[("country", "2")]), None);
    }

    #[test]
    fn displays_location() {
        let mut nameless = us();
        nameless.code = None;

        assert_eq!(
            location_display(
                Some(&us()),
                Some(&california()),
                Some(&los_angeles()),
            ),
            "Los Angeles, California",
        );
        assert_eq!(
            location_display(Some(&us()), Some(&california()), None),
            "California, US",
        );
        assert_eq!(
            location_display(Some(&nameless), Some(&california()), None),
            "California, United States",
        );
        assert_eq!(location_display(Some(&us()), None, None), "United States");
    }

    #[test]
    fn shows_college_name_of_college_games_only() {
        let r = reference();
        let mut college = fixture::listing("Campus Mole");
        college.college_game = Some(true);
        college.college_name = CollegeName::new("State University");
        let mut other = college.clone();
        other.college_game = Some(false);

        assert!(Entry::new(college, &r).college_name.is_some());
        assert!(Entry::new(other, &r).college_name.is_none());
    }

    #[test]
    fn builds_list_url() {
        let f = filter(&[("region", "10"), ("no_city", "on")]);

        assert_eq!(list_url("/games/", &f), "/games/?region=10&no_city=1");
    }
}
