//! [`City`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use super::{country, region, Coordinates, Name};

/// Lowest level of the geography hierarchy.
#[derive(Clone, Debug, PartialEq)]
pub struct City {
    /// ID of this [`City`].
    pub id: Id,

    /// [`Name`] of this [`City`].
    pub name: Name,

    /// Region this [`City`] belongs to.
    pub region: region::Id,

    /// Country this [`City`] belongs to.
    pub country: country::Id,

    /// [`Coordinates`] of this [`City`], if known.
    pub coordinates: Option<Coordinates>,
}

/// ID of a [`City`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(i64);

impl Id {
    /// Creates a new [`Id`] out of its raw value.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }
}
