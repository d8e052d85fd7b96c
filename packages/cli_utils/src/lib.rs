#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared CLI utilities for the data tools.
//!
//! Provides [`init_logger`], async file ingestion ([`ingest`]) and the
//! pretty-printing / table helpers used to show results in a terminal
//! ([`render`]).

pub mod ingest;
pub mod render;

/// Initializes the global `pretty_env_logger` logger from `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger() {
    pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .try_init()
        .ok(); // Ignore error if logger was already set (e.g., in tests)
}
