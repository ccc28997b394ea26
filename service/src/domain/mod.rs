//! Domain definitions.

pub mod geography;
pub mod listing;

pub use self::listing::Listing;
