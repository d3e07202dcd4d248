use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::get,
    serve, Router,
};
use stockboard_utils::{init_logging, log_warn, AppConfig};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

mod error;
mod handlers;
mod metrics;
mod middleware;
mod routes;
mod service;

use handlers::{health_check, metrics_handler};
use metrics::InventoryMetrics;
use middleware::request_id_middleware;
use service::InventoryService;

#[derive(Clone)]
pub struct AppState {
    pub service: InventoryService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let metrics = Arc::new(InventoryMetrics::new()?);
        let service = InventoryService::new(
            config.inventory.normalizer.clone(),
            metrics,
            config.inventory.fallback_to_placeholder,
        );

        Ok(Self {
            service,
            config: Arc::new(config),
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration ({}), using defaults", e);
        AppConfig::default()
    });

    init_logging(&config.logging)?;
    config.validate()?;
    info!("Starting Stockboard inventory API");

    let state = AppState::new(config.clone())?;

    // Initial load; on failure the placeholder is served if enabled
    if let Err(e) = state
        .service
        .load_file(config.inventory.data_file.clone())
        .await
    {
        log_warn!("Initial inventory load failed", error = %e);
    }

    let app = create_app(state, &config);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Inventory API listening on {}", addr);

    serve(listener, app).await?;

    Ok(())
}

fn create_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", routes::create_api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([Method::GET, Method::POST])
                        .allow_headers([header::CONTENT_TYPE]),
                )
                .layer(DefaultBodyLimit::max(config.server.max_request_size))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.server.timeout_seconds,
                )))
                .layer(axum::middleware::from_fn(request_id_middleware)),
        )
        .with_state(state)
}
