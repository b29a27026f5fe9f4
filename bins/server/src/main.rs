//! Pixdrop API Server
//!
//! Main entry point for the image upload relay.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixdrop_api::{AppState, create_router};
use pixdrop_core::storage::{StorageProvider, StorageService};
use pixdrop_shared::{AppConfig, CloudinaryConfig, StorageBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixdrop=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Select the storage backend
    let provider = match config.storage.backend {
        StorageBackend::Local => StorageProvider::local_fs(
            &config.storage.upload_dir,
            &config.storage.public_base_url,
        ),
        StorageBackend::Remote => StorageProvider::cloudinary(
            CloudinaryConfig::load().context("Failed to load Cloudinary credentials")?,
        ),
    };
    let storage = StorageService::from_provider(provider).context("Failed to initialize storage")?;
    info!(
        backend = config.storage.backend.as_str(),
        provider = storage.provider_name(),
        "Storage configured"
    );

    // Create application state
    let state = AppState {
        storage: Arc::new(storage),
    };

    // Create router
    let app = create_router(state, &config)?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Starting server on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
