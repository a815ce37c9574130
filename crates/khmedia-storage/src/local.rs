use crate::keys::{generate_unique_filename, object_path};
use crate::traits::{StorageError, StorageResult};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem media root
///
/// Files are addressed by paths relative to the root (e.g.
/// `gallery/images/annual-day-1a2b3c4d.jpg`) and served under `base_url`.
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Media root directory (e.g., "./media")
    /// * `base_url` - URL prefix the root is served under (e.g., "/media/")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: impl Into<String>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create media root {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url: base_url.into(),
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Map a relative path onto the media root, refusing anything that could
    /// escape it.
    fn relative_to_path(&self, relative: &str) -> StorageResult<PathBuf> {
        if relative.is_empty() || relative.starts_with('/') || relative.contains('\\') {
            return Err(StorageError::InvalidKey(relative.to_string()));
        }

        let candidate = Path::new(relative);
        if !candidate
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::InvalidKey(relative.to_string()));
        }

        Ok(self.base_path.join(candidate))
    }

    /// Public URL for a relative path.
    pub fn url_for(&self, relative: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            relative.trim_start_matches('/')
        )
    }

    /// Write `data` under `folder` with a unique name and return the relative path.
    pub async fn save(&self, folder: &str, original_name: &str, data: &[u8]) -> StorageResult<String> {
        let relative = object_path(Some(folder), &generate_unique_filename(original_name));
        let path = self.relative_to_path(&relative)?;
        let start = std::time::Instant::now();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %relative,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local media file saved"
        );

        Ok(relative)
    }

    /// Whether the file backing `relative` is present on disk.
    pub async fn exists(&self, relative: &str) -> bool {
        match self.relative_to_path(relative) {
            Ok(path) => fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Remove a file. Returns `Ok(false)` when it was already gone.
    pub async fn delete(&self, relative: &str) -> StorageResult<bool> {
        let path = self.relative_to_path(relative)?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %relative, "Local media file deleted");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %relative, "Local media file already absent");
                Ok(false)
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
