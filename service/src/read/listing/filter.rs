//! [`FilterCriteria`] definitions.

use std::{cmp::Ordering, collections::BTreeSet, str::FromStr};

use common::Kind;
use url::form_urlencoded;

use crate::domain::{
    geography::{city, country, region},
    listing::{Duration, FilmingStatus, Format},
    Listing,
};

/// Normalized set of restrictions applied to a list of [`Listing`]s.
///
/// The default [`FilterCriteria`] restricts nothing.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilterCriteria {
    /// Text to be searched in [`Listing::name`] or [`Listing::description`]
    /// case-insensitively.
    pub text: Option<String>,

    /// [`Format`]s to match any of. Empty means any [`Format`].
    pub formats: BTreeSet<Format>,

    /// [`Duration`]s to match any of. Empty means any [`Duration`].
    pub durations: BTreeSet<Duration>,

    /// [`FilmingStatus`]es to match any of. Empty means any
    /// [`FilmingStatus`].
    pub filming_statuses: BTreeSet<FilmingStatus>,

    /// Country to match.
    pub country: Option<country::Id>,

    /// Region to match.
    pub region: Option<region::Id>,

    /// City to match.
    pub city: Option<city::Id>,

    /// Indicator whether only [`Listing`]s without a region match.
    ///
    /// Ignored if the [`FilterCriteria::region`] is specified.
    pub no_region: bool,

    /// Indicator whether only [`Listing`]s without a city match.
    ///
    /// Ignored if the [`FilterCriteria::city`] is specified.
    pub no_city: bool,

    /// Restriction of [`Listing`]s not known to be running.
    pub inactive: TriState,

    /// Restriction of college [`Listing`]s.
    pub college: TriState,

    /// Restriction of friends-and-family [`Listing`]s.
    pub friends_and_family: TriState,

    /// Restriction of charity [`Listing`]s.
    pub charity: TriState,

    /// Restriction of [`Listing`]s with an open casting call.
    pub casting: TriState,
}

/// Restriction of a boolean property.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TriState {
    /// The property isn't restricted.
    #[default]
    Unrestricted,

    /// Only values where the property doesn't hold match.
    Exclude,

    /// Only values where the property holds match.
    Only,
}

impl TriState {
    /// Checks whether the provided `flag` passes this [`TriState`].
    ///
    /// Unknown flags don't hold.
    #[must_use]
    pub fn admits(self, flag: Option<bool>) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Exclude => flag != Some(true),
            Self::Only => flag == Some(true),
        }
    }

    /// Returns the query parameter value of this [`TriState`], if any.
    #[must_use]
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Self::Unrestricted => None,
            Self::Exclude => Some("exclude"),
            Self::Only => Some("only"),
        }
    }

    /// Parses a query parameter value.
    ///
    /// Anything but `exclude` or `only` is [`TriState::Unrestricted`].
    #[must_use]
    pub fn from_param(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "exclude" => Self::Exclude,
            "only" => Self::Only,
            _ => Self::Unrestricted,
        }
    }
}

/// Parameter keys understood by [`FilterCriteria::from_query()`].
mod key {
    pub(super) const TEXT: &str = "q";
    pub(super) const FORMAT: &str = "game_format";
    pub(super) const DURATION: &str = "game_duration";
    pub(super) const FILMING_STATUS: &str = "filming_status";
    pub(super) const COUNTRY: &str = "country";
    pub(super) const REGION: &str = "region";
    pub(super) const CITY: &str = "city";
    pub(super) const NO_REGION: &str = "no_region";
    pub(super) const NO_CITY: &str = "no_city";
    pub(super) const INACTIVE: &str = "inactive";
    pub(super) const COLLEGE: &str = "college";
    pub(super) const FRIENDS_AND_FAMILY: &str = "friends_and_family";
    pub(super) const CHARITY: &str = "charity";
    pub(super) const CASTING: &str = "casting";
}

impl FilterCriteria {
    /// Builds [`FilterCriteria`] out of the request parameter `pairs`.
    ///
    /// Multi-select keys may be repeated. For the others, the last valid
    /// value wins. Values that can't be parsed and unknown keys are ignored.
    #[must_use]
    pub fn from_query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut this = Self::default();
        for (k, v) in pairs {
            let v = v.as_ref().trim();
            match k.as_ref() {
                key::TEXT => {
                    if !v.is_empty() {
                        this.text = Some(v.to_owned());
                    }
                }
                key::FORMAT => insert_parsed(&mut this.formats, v),
                key::DURATION => insert_parsed(&mut this.durations, v),
                key::FILMING_STATUS => {
                    insert_parsed(&mut this.filming_statuses, v);
                }
                key::COUNTRY => replace_parsed(&mut this.country, v),
                key::REGION => replace_parsed(&mut this.region, v),
                key::CITY => replace_parsed(&mut this.city, v),
                key::NO_REGION => this.no_region = is_truthy(v),
                key::NO_CITY => this.no_city = is_truthy(v),
                key::INACTIVE => this.inactive = TriState::from_param(v),
                key::COLLEGE => this.college = TriState::from_param(v),
                key::FRIENDS_AND_FAMILY => {
                    this.friends_and_family = TriState::from_param(v);
                }
                key::CHARITY => this.charity = TriState::from_param(v),
                key::CASTING => this.casting = TriState::from_param(v),
                _ => {}
            }
        }
        this
    }

    /// Renders these [`FilterCriteria`] back into the canonical request
    /// parameter pairs.
    ///
    /// [`FilterCriteria::from_query()`] of the result gives back equal
    /// [`FilterCriteria`].
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![];
        if let Some(text) = &self.text {
            out.push((key::TEXT, text.clone()));
        }
        out.extend(self.formats.iter().map(|f| (key::FORMAT, f.code().into())));
        out.extend(
            self.durations
                .iter()
                .map(|d| (key::DURATION, d.code().into())),
        );
        out.extend(
            self.filming_statuses
                .iter()
                .map(|s| (key::FILMING_STATUS, s.code().into())),
        );
        if let Some(id) = self.country {
            out.push((key::COUNTRY, id.to_string()));
        }
        if let Some(id) = self.region {
            out.push((key::REGION, id.to_string()));
        }
        if let Some(id) = self.city {
            out.push((key::CITY, id.to_string()));
        }
        if self.no_region {
            out.push((key::NO_REGION, "1".into()));
        }
        if self.no_city {
            out.push((key::NO_CITY, "1".into()));
        }
        for (k, state) in [
            (key::INACTIVE, self.inactive),
            (key::COLLEGE, self.college),
            (key::FRIENDS_AND_FAMILY, self.friends_and_family),
            (key::CHARITY, self.charity),
            (key::CASTING, self.casting),
        ] {
            if let Some(v) = state.as_param() {
                out.push((k, v.into()));
            }
        }
        out
    }

    /// Renders these [`FilterCriteria`] as a URL-encoded query string
    /// (without the leading `?`).
    #[must_use]
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query())
            .finish()
    }

    /// Indicates whether these [`FilterCriteria`] restrict nothing.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        *self == Self::default()
    }

    /// Indicates whether a [`Listing`] without a region is required.
    ///
    /// An explicitly specified region wins over the flag.
    #[must_use]
    pub fn requires_no_region(&self) -> bool {
        self.no_region && self.region.is_none()
    }

    /// Indicates whether a [`Listing`] without a city is required.
    ///
    /// An explicitly specified city wins over the flag.
    #[must_use]
    pub fn requires_no_city(&self) -> bool {
        self.no_city && self.city.is_none()
    }

    /// Checks whether the provided [`Listing`] passes these
    /// [`FilterCriteria`].
    ///
    /// Deleted [`Listing`]s never pass.
    #[must_use]
    pub fn matches(&self, listing: &Listing) -> bool {
        if listing.is_deleted() {
            return false;
        }

        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let in_name = listing.name.to_string().to_lowercase().contains(&needle);
            let in_description = listing
                .description
                .as_ref()
                .is_some_and(|d| d.to_string().to_lowercase().contains(&needle));
            if !in_name && !in_description {
                return false;
            }
        }

        if !self.formats.is_empty() && !self.formats.contains(&listing.format) {
            return false;
        }
        if !self.durations.is_empty()
            && !listing.duration.is_some_and(|d| self.durations.contains(&d))
        {
            return false;
        }
        if !self.filming_statuses.is_empty()
            && !listing
                .filming_status
                .is_some_and(|s| self.filming_statuses.contains(&s))
        {
            return false;
        }

        if self.country.is_some_and(|id| listing.country != id) {
            return false;
        }
        match self.region {
            Some(id) if listing.region != Some(id) => return false,
            None if self.no_region && listing.region.is_some() => return false,
            Some(_) | None => {}
        }
        match self.city {
            Some(id) if listing.city != Some(id) => return false,
            None if self.no_city && listing.city.is_some() => return false,
            Some(_) | None => {}
        }

        self.inactive.admits(Some(listing.active != Some(true)))
            && self.college.admits(listing.college_game)
            && self.friends_and_family.admits(listing.friends_and_family)
            && self.charity.admits(listing.for_charity)
            && self.casting.admits(Some(listing.is_casting()))
    }
}

/// Compares [`Listing`]s in the order they're listed in: by lowercased
/// [`Listing::name`], then by [`Listing::id`].
#[must_use]
pub fn order(a: &Listing, b: &Listing) -> Ordering {
    a.name
        .to_string()
        .to_lowercase()
        .cmp(&b.name.to_string().to_lowercase())
        .then_with(|| a.id.cmp(&b.id))
}

/// Checks whether the provided flag `value` is turned on.
fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "on" | "true" | "yes",
    )
}

/// Inserts the [`Kind`] parsed from its `code` into the `set`, if it parses.
fn insert_parsed<K: Kind + FromStr + Ord>(set: &mut BTreeSet<K>, code: &str) {
    if let Ok(kind) = code.parse() {
        _ = set.insert(kind);
    }
}

/// Replaces the `slot` with the parsed `value`, if it parses.
fn replace_parsed<T: FromStr>(slot: &mut Option<T>, value: &str) {
    if let Ok(v) = value.parse() {
        *slot = Some(v);
    }
}
