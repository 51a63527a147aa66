//! Relational persistence for the cocktail order service and its binaries.

pub mod db_report;
pub mod entities;
pub mod order_storage;

pub use order_storage::{SeaOrmOrderStorage, open_storage};
