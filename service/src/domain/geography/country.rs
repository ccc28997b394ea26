//! [`Country`] definitions.

use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};

use super::Name;

/// Top level of the geography hierarchy.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Country {
    /// ID of this [`Country`].
    pub id: Id,

    /// [`Name`] of this [`Country`].
    pub name: Name,

    /// ISO 3166-1 alpha-2 [`Code`] of this [`Country`], if known.
    pub code: Option<Code>,
}

/// ID of a [`Country`].
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

/// Two-letter code of a [`Country`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, Into, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Code(String);

impl Code {
    /// Creates a new [`Code`] if the given `code` consists of two ASCII
    /// letters.
    ///
    /// The [`Code`] is normalized to uppercase.
    #[must_use]
    pub fn new(code: impl AsRef<str>) -> Option<Self> {
        let code = code.as_ref();
        (code.len() == 2 && code.bytes().all(|b| b.is_ascii_alphabetic()))
            .then(|| Self(code.to_ascii_uppercase()))
    }
}
