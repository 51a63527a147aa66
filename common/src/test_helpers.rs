/// Shared test helpers for the `order_api` and `cocktail` crates.
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub type TestResult<T = ()> = Result<T, Box<dyn Error + Send + Sync>>;

static GLOBAL_TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier in the form `{prefix}-{millis}-{counter}`, safe across
/// parallel tests.
pub fn generate_unique_id(prefix: &str) -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let counter = GLOBAL_TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}-{}-{}", prefix, timestamp, counter)
}

/// `TEST_DATABASE_URL` when set, otherwise a private in-memory SQLite database.
pub fn get_test_database_url() -> String {
    std::env::var("TEST_DATABASE_URL").unwrap_or_else(|_| "sqlite::memory:".to_string())
}

/// Opens a connection to the test database.
///
/// The pool is capped at a single connection so every query sees the same
/// in-memory SQLite database.
#[cfg(feature = "test-helpers")]
pub async fn create_test_connection() -> TestResult<sea_orm::DatabaseConnection> {
    let mut options = sea_orm::ConnectOptions::new(get_test_database_url());
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    Ok(sea_orm::Database::connect(options).await?)
}
