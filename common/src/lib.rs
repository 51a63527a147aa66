//! Shared building blocks for the cocktail order workspace: configuration,
//! build-time YAML assembly and test helpers.

pub mod config;
pub mod yaml_include;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::{generate_unique_id, get_test_database_url};
