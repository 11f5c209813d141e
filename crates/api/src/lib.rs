//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - File upload, download, delete and list routes
//! - The endpoint catalog and health check
//! - JSON error envelopes

pub mod error;
pub mod routes;

use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use filegate_core::storage::StorageService;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage adapter for the configured bucket.
    pub storage: Arc<StorageService>,
    /// Largest request body accepted by the upload route.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Creates application state around a storage service.
    pub fn new(storage: StorageService, max_upload_bytes: usize) -> Self {
        Self {
            storage: Arc::new(storage),
            max_upload_bytes,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes(&state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
