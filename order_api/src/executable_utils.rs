use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use clap::Parser;
use common::config::{CartConfig, Config, NotifierConfig};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::{error::Error, sync::Arc};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

use crate::{
    handlers::{
        add_to_cart, create_order, delete_order, get_cart, get_order, health_check, list_orders,
        place_order, remove_from_cart, root, update_order_status,
    },
    notifier::{AdminNotifier, DisabledNotifier, HttpAdminNotifier},
    storage::OrderStorage,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "target/debug/config/total_config.yaml")]
    pub config: String,
}

/// Loads `.env`, parses the command line and reads the config file, applying
/// environment overrides.
pub fn initialize_executable() -> Result<Config, Box<dyn Error + Send + Sync>> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("No .env loaded: {}", e);
    }

    let args = Args::parse();
    println!("Loading config from: {}", args.config);
    let mut config = Config::load(&args.config)?;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

/// `RUST_LOG` wins over the configured level.
pub fn initialize_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn build_notifier(config: &NotifierConfig) -> Arc<dyn AdminNotifier> {
    if config.enabled {
        Arc::new(HttpAdminNotifier::new(config.admin_url.clone()))
    } else {
        tracing::info!("Admin notifications disabled");
        Arc::new(DisabledNotifier)
    }
}

/// Credentialed CORS so the cart cookies travel cross-origin. An empty origin
/// list mirrors whatever origin asks.
pub fn build_cors(allowed_origins: &[String]) -> Result<CorsLayer, Box<dyn Error + Send + Sync>> {
    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::mirror_request()
    } else {
        let origins = allowed_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;
        AllowOrigin::list(origins)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn OrderStorage>,
    pub notifier: Arc<dyn AdminNotifier>,
    pub cart: CartConfig,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn OrderStorage>,
        notifier: Arc<dyn AdminNotifier>,
        cart: CartConfig,
    ) -> Self {
        Self {
            storage,
            notifier,
            cart,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/orders", get(list_orders).post(create_order))
        .route("/api/orders/", get(list_orders).post(create_order))
        .route("/api/orders/cart", get(get_cart))
        .route("/api/orders/cart/{cocktail_id}", delete(remove_from_cart))
        .route("/api/orders/add", post(add_to_cart))
        .route("/api/orders/place", post(place_order))
        .route("/api/orders/{order_id}", get(get_order).delete(delete_order))
        .route("/api/orders/{order_id}/status", put(update_order_status))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_backend(
    config: Config,
    storage: Arc<dyn OrderStorage>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let state = AppState::new(storage, build_notifier(&config.notifier), config.cart.clone());

    let prometheus = PrometheusBuilder::new().install_recorder()?;
    let app = build_router(state)
        .route(
            "/metrics",
            get(move || {
                let prometheus = prometheus.clone();
                async move { prometheus.render() }
            }),
        )
        .layer(build_cors(&config.backend.allowed_origins)?);

    tracing::info!("Starting backend service at {}", config.backend.server_address);
    let listener = tokio::net::TcpListener::bind(&config.backend.server_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_rejects_invalid_origin() {
        assert!(build_cors(&["http://localhost:5173".to_string()]).is_ok());
        assert!(build_cors(&["bad\norigin".to_string()]).is_err());
    }

    #[test]
    fn test_args_default_config_path() {
        let args = Args::parse_from(["backend"]);
        assert_eq!(args.config, "target/debug/config/total_config.yaml");
    }
}
