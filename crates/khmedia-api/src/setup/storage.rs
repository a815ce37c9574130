//! Storage backend setup

use anyhow::{Context, Result};
use khmedia_core::Config;
use khmedia_services::{create_local_storage, create_remote_store, LocalStorage, RemoteStore};
use std::sync::Arc;

/// The local media root plus the remote store when one is configured.
#[derive(Clone)]
pub struct Stores {
    pub local: LocalStorage,
    pub remote: Option<Arc<dyn RemoteStore>>,
}

pub async fn setup_storage(config: &Config) -> Result<Stores> {
    let local = create_local_storage(&config.media)
        .await
        .context("Failed to initialize local media root")?;
    let remote = create_remote_store(&config.remote).context("Failed to create remote store")?;

    tracing::info!(
        media_root = %config.media.media_root,
        media_url = %config.media.media_url,
        remote_enabled = remote.is_some(),
        storage_priority = %config.storage_priority(),
        "Storage initialized"
    );

    Ok(Stores { local, remote })
}
