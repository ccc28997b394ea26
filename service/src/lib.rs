//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;

use derive_more::Debug;
use smart_default::SmartDefault;

#[cfg(doc)]
use infra::Database;

use crate::domain::geography::Centroids;

pub use self::{command::Command, query::Query};

/// [`Service`] configuration.
#[derive(Clone, Debug, SmartDefault)]
pub struct Config {
    /// Number of [`Listing`]s on a single page of a list.
    ///
    /// [`Listing`]: domain::Listing
    #[default = 10]
    pub per_page: usize,

    /// Path of the list view the location panel links to.
    #[default = "/games/"]
    pub list_path: String,

    /// Number of attempts to write a [`Listing`] when its [`Slug`] is taken
    /// concurrently.
    ///
    /// [`Listing`]: domain::Listing
    /// [`Slug`]: domain::listing::Slug
    #[default = 3]
    pub slug_retries: usize,

    /// Country [`Centroids`] to display countries on a map at.
    #[debug(skip)]
    #[default(Centroids::embedded())]
    pub centroids: &'static Centroids,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    #[must_use]
    pub fn new(config: Config, database: Db) -> Self {
        Self { config, database }
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }
}
