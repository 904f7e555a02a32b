//! HTTP API server for report exports
//!
//! Routes are organized into modules:
//! - routes::reports: Spreadsheet and PDF exports
//! - routes::health: Liveness check

pub mod error;
pub mod routes;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use axum::{
    routing::{get, post},
    Router,
};
use finreport_config::Config;
use finreport_core::{DefaultErrorLogger, ErrorLogger};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub error_logger: Arc<dyn ErrorLogger + Send + Sync>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            error_logger: Arc::new(DefaultErrorLogger),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::health::api_liveness;
    use routes::reports::{api_export_excel, api_export_pdf};

    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/test", get(api_liveness))
        .route("/api/export-excel", post(api_export_excel))
        .route("/api/export-pdf", post(api_export_pdf))
        .layer(cors)
        .with_state(state)
}

/// Any origin when none are configured, otherwise only the listed ones
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers(Any)
}

/// Bind the configured address and serve until Ctrl+C
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let router = create_router(AppState::new(config));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    log::info!("Starting finreport server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - GET  /test (Liveness check)");
    log::info!("  - POST /api/export-excel (Spreadsheet export)");
    log::info!("  - POST /api/export-pdf (PDF export)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

// ==================== Tests ====================
