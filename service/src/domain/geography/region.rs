//! [`Region`] definitions.

use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use super::{country, Coordinates, Name};

/// State, province or any other first-level subdivision of a country.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// ID of this [`Region`].
    pub id: Id,

    /// [`Name`] of this [`Region`].
    pub name: Name,

    /// Country this [`Region`] belongs to.
    pub country: country::Id,

    /// [`Coordinates`] of this [`Region`] itself, if known.
    pub coordinates: Option<Coordinates>,
}

/// ID of a [`Region`].
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
