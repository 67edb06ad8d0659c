//! HTTP query API over the record store.

pub mod routes;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ProcessingError, Result};
use crate::store::RecordStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/observations", get(routes::observations))
        .route("/api/stats", get(routes::stats))
        .route("/api/outliers", get(routes::outliers))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(config: &ServerConfig, store: Arc<dyn RecordStore>) -> Result<()> {
    let address = config.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(|e| ProcessingError::Server(format!("cannot listen on {}: {}", address, e)))?;

    info!(
        "{} v{} listening on {} (store: {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        address,
        store.describe()
    );

    axum::serve(listener, router(AppState::new(store)))
        .await
        .map_err(|e| ProcessingError::Server(e.to_string()))
}
