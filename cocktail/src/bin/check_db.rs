use std::error::Error;

use cocktail::db_report::{collect_report, render_report};
use order_api::executable_utils::{initialize_executable, initialize_tracing};
use sea_orm::Database;

/// Prints every table of the configured database with its columns and rows.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let config = initialize_executable()?;
    initialize_tracing(&config.backend.log_level);

    tracing::info!("Inspecting {}", config.common.database_url);
    let db = Database::connect(&config.common.database_url).await?;
    let reports = collect_report(&db).await?;
    print!("{}", render_report(&reports));
    db.close().await?;
    Ok(())
}
