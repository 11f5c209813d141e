//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod files;
pub mod health;
pub mod info;

/// Creates the API router with all routes.
pub fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(info::routes())
        .merge(health::routes())
        .merge(files::routes(state.max_upload_bytes))
}
