//! Application setup and initialization

pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use khmedia_core::Config;
use khmedia_infra::AdminAccessGuard;
use khmedia_services::{
    MediaCleanup, MediaRepository, MediaService, MediaUploadService, StorageResolver,
};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    khmedia_infra::init_telemetry(&config.base.environment)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let stores = storage::setup_storage(&config).await?;
    let state = build_state(config, stores);
    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}

/// Wire services on top of the storage backends.
pub fn build_state(config: Config, stores: storage::Stores) -> Arc<AppState> {
    let repository = Arc::new(MediaRepository::new());
    let uploader = MediaUploadService::new(
        config.media.max_upload_size_bytes,
        stores.local.clone(),
        stores.remote.clone(),
    );
    let cleanup = MediaCleanup::new(stores.local.clone(), stores.remote);
    let resolver = StorageResolver::new(config.storage_priority(), stores.local);
    let media = MediaService::new(repository, uploader, cleanup, resolver);

    let guard = Arc::new(AdminAccessGuard::new(&config.admin));
    if config.admin.admin_api_token.is_none() {
        tracing::warn!("ADMIN_API_TOKEN not set; admin routes accept unauthenticated requests");
    }

    Arc::new(AppState::new(config, media, guard))
}
