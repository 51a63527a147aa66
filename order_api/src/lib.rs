//! Order-taking HTTP service for the cocktail ordering app.
//!
//! The service is storage-agnostic: it talks to an [`storage::OrderStorage`]
//! and pushes cart changes to an [`notifier::AdminNotifier`]. The relational
//! backend lives in the `cocktail` crate.

pub mod cart;
pub mod error;
pub mod executable_utils;
pub mod handlers;
pub mod model;
pub mod notifier;
pub mod storage;
