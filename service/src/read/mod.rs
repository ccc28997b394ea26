//! Read entities definitions.

pub mod geography;
pub mod listing;
pub mod location_panel;
pub mod map;

pub use self::{location_panel::Panel, map::MapData};
