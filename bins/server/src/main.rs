//! Filegate API Server
//!
//! Main entry point for the Filegate file-transfer service.

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filegate_api::{AppState, create_router};
use filegate_core::storage::{StorageConfig, StorageService};
use filegate_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filegate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Create storage service
    let storage = StorageService::from_config(StorageConfig::try_from(&config.storage)?)?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        "Storage service configured"
    );

    // Create application state
    let state = AppState::new(storage, config.server.max_upload_bytes);

    // Create router
    let app = create_router(state);

    // Start server
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
