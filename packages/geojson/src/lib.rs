#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `GeoJSON` cleaner.
//!
//! Turns the HTML attribute table that GIS exporters embed in a feature's
//! `Description` property into flat key/value properties
//! ([`cleaner::flatten`]), with an optional structural `GeoJSON` check
//! ([`validate::check_geojson`]).
//!
//! The cleaner is a pure in-memory transform: it performs no I/O and holds
//! no state between calls.

pub mod cleaner;
pub mod description_table;
pub mod validate;

use data_tools_geojson_models::DocumentError;

pub use cleaner::{FlattenStats, flatten, flatten_in_place, flatten_str, flatten_value};

/// Errors that can occur while cleaning a document.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    /// The input is not a feature collection (bad JSON, no `features`
    /// array, or a non-object feature).
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] DocumentError),

    /// The document is not structurally valid `GeoJSON`.
    #[error("Invalid GeoJSON: {0}")]
    InvalidGeoJson(String),
}
