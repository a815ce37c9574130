use crate::{LocalStorage, RemoteStore, StorageResult, SupabaseStorage};
use khmedia_core::{MediaStorageConfig, RemoteStorageConfig};
use std::sync::Arc;

/// Create the remote store client, or `None` when credentials are missing or
/// still set to the sample placeholders.
pub fn create_remote_store(config: &RemoteStorageConfig) -> StorageResult<Option<Arc<dyn RemoteStore>>> {
    if !config.is_configured() {
        tracing::info!("Remote storage not configured; media will be stored locally");
        return Ok(None);
    }

    let (Some(url), Some(key)) = (config.url.as_deref(), config.key.as_deref()) else {
        return Ok(None);
    };

    let storage = SupabaseStorage::new(url, key, config.timeout())?;
    tracing::info!(
        base_url = %url,
        timeout_secs = config.timeout_secs,
        "Remote storage configured"
    );
    Ok(Some(Arc::new(storage)))
}

/// Create the local media root, making the directory if needed.
pub async fn create_local_storage(config: &MediaStorageConfig) -> StorageResult<LocalStorage> {
    LocalStorage::new(&config.media_root, config.media_url.clone()).await
}
