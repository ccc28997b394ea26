//! Marker types describing moments in an entity lifecycle.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing the last modification of an entity.
#[derive(Clone, Copy, Debug)]
pub struct Modification;

/// Marker type describing an entity (soft) deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;
