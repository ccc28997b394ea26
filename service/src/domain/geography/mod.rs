//! Geography reference definitions.
//!
//! Countries, regions and cities form a three-level hierarchy that listings
//! are located in. The hierarchy is read-only for the [`Service`].
//!
//! [`Service`]: crate::Service

pub mod centroid;
pub mod city;
pub mod country;
pub mod region;

use derive_more::{AsRef, Display};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

pub use self::{
    centroid::Centroids, city::City, country::Country, region::Region,
};

/// Geographic point used for displaying a node on a map.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,

    /// Longitude in degrees.
    pub longitude: f64,
}

impl Coordinates {
    /// Fallback [`Coordinates`] for nodes without a known location.
    pub const ORIGIN: Self = Self {
        latitude: 0.0,
        longitude: 0.0,
    };

    /// Creates [`Coordinates`] out of the optional database columns.
    ///
    /// Both parts must be present.
    #[must_use]
    pub fn from_parts(
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Option<Self> {
        Some(Self {
            latitude: latitude?,
            longitude: longitude?,
        })
    }

    /// Calculates the arithmetic mean of the provided [`Coordinates`].
    ///
    /// Returns [`None`] if there are none.
    #[must_use]
    pub fn mean(points: impl IntoIterator<Item = Self>) -> Option<Self> {
        let (mut lat, mut lng, mut n) = (0.0, 0.0, 0_u32);
        for p in points {
            lat += p.latitude;
            lng += p.longitude;
            n += 1;
        }
        (n > 0).then(|| Self {
            latitude: lat / f64::from(n),
            longitude: lng / f64::from(n),
        })
    }
}

/// Display name of a geography node.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

#[cfg(test)]
mod spec {
    use super::Coordinates;

    #[test]
    fn averages_coordinates() {
        let mean = Coordinates::mean([
            Coordinates {
                latitude: 34.0,
                longitude: -118.0,
            },
            Coordinates {
                latitude: 38.0,
                longitude: -122.0,
            },
        ])
        .unwrap();

        assert!((mean.latitude - 36.0).abs() < f64::EPSILON);
        assert!((mean.longitude + 120.0).abs() < f64::EPSILON);
        assert_eq!(Coordinates::mean([]), None);
    }

    #[test]
    fn requires_both_parts() {
        assert!(Coordinates::from_parts(Some(1.0), Some(2.0)).is_some());
        assert!(Coordinates::from_parts(Some(1.0), None).is_none());
        assert!(Coordinates::from_parts(None, Some(2.0)).is_none());
    }
}
