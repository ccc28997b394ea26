//! [`Command`] definition.

pub mod attributes;
pub mod create_listing;
pub mod delete_listing;
pub mod set_schedule;
pub mod update_listing;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    attributes::Attributes, create_listing::CreateListing,
    delete_listing::DeleteListing, set_schedule::SetSchedule,
    update_listing::UpdateListing,
};
