//! Geography reference read definitions.

use crate::domain::geography::{country, region};
#[cfg(doc)]
use crate::domain::geography::{City, Country, Region};

/// Case-insensitive search of geography nodes by their names.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NameSearch(Option<String>);

impl NameSearch {
    /// Creates a new [`NameSearch`] out of the raw `term`.
    ///
    /// A blank `term` matches everything.
    #[must_use]
    pub fn new(term: Option<&str>) -> Self {
        Self(
            term.map(str::trim)
                .filter(|t| !t.is_empty())
                .map(ToOwned::to_owned),
        )
    }

    /// Returns the term to search for, if any.
    #[must_use]
    pub fn term(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Checks whether the provided `name` matches this [`NameSearch`].
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.0
            .as_ref()
            .map_or(true, |t| name.to_lowercase().contains(&t.to_lowercase()))
    }
}

/// Selector of [`Country`]s.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CountrySearch {
    /// [`NameSearch`] to apply.
    pub name: NameSearch,
}

/// Selector of [`Region`]s of a [`Country`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegionSearch {
    /// [`Country`] to list the [`Region`]s of.
    pub country: country::Id,

    /// [`NameSearch`] to apply.
    pub name: NameSearch,
}

/// Selector of [`City`]s of a [`Region`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CitySearch {
    /// [`Region`] to list the [`City`]s of.
    pub region: region::Id,

    /// [`NameSearch`] to apply.
    pub name: NameSearch,
}

#[cfg(test)]
mod spec {
    use super::NameSearch;

    #[test]
    fn searches_case_insensitively() {
        let search = NameSearch::new(Some(" cali "));

        assert_eq!(search.term(), Some("cali"));
        assert!(search.matches("California"));
        assert!(!search.matches("Oregon"));
    }

    #[test]
    fn blank_term_matches_everything() {
        assert!(NameSearch::new(Some("   ")).matches("Anything"));
        assert!(NameSearch::new(None).matches("Anything"));
    }
}
