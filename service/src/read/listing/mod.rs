//! [`Listing`]-related read definitions.

pub mod filter;

use crate::domain::{
    listing::{self, slug, Schedule},
    Listing,
};

pub use self::filter::{FilterCriteria, TriState};

/// Selector of the [`Slug`]s occupied by other active [`Listing`]s sharing the
/// same [`slug::Base`].
///
/// [`Slug`]: listing::Slug
#[derive(Clone, Debug)]
pub struct SiblingsOf {
    /// [`slug::Base`] to look the siblings for.
    pub base: slug::Base,

    /// [`Listing`] to be excluded from the siblings, if any.
    pub except: Option<listing::Id>,
}

/// [`Listing`] along with its [`Schedule`], as shown on its own page.
#[derive(Clone, Debug)]
pub struct Detail {
    /// Detailed [`Listing`].
    pub listing: Listing,

    /// [`Schedule`] of the [`Listing`].
    pub schedule: Schedule,
}

/// [`Slug`]s occupied by active [`Listing`]s.
///
/// [`Slug`]: listing::Slug
#[derive(Clone, Debug, Default)]
pub struct TakenSlugs(pub Vec<listing::Slug>);

pub mod list {
    //! [`Listing`]s list definitions.

    use common::define_pagination;

    use crate::domain::Listing;

    use super::FilterCriteria;

    define_pagination!(Listing, FilterCriteria);
}
