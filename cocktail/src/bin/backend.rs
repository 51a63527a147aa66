use std::error::Error;

use cocktail::open_storage;
use order_api::executable_utils::{initialize_executable, initialize_tracing, run_backend};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Starting backend...");
    let config = initialize_executable()?;
    initialize_tracing(&config.backend.log_level);
    let storage = open_storage(&config).await?;
    run_backend(config, storage).await
}
