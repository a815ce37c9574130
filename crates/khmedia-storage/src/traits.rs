//! Storage abstraction trait
//!
//! Defines the contract of the remote object store. The local media root has a
//! single implementation and is used directly.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Invalid storage path: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Remote object store.
///
/// Failures never reach the caller as errors: uploads yield `None`, deletes and
/// bucket bootstrap yield `false`, and the cause is logged. Callers treat a
/// missing URL as "no image".
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Upload `data` under a freshly generated unique name and return its public URL.
    ///
    /// The stored name is `{slug(stem)}-{8 hex}{.ext}` placed under `folder`
    /// when one is given.
    async fn upload(
        &self,
        data: Bytes,
        original_name: &str,
        content_type: &str,
        bucket: &str,
        folder: Option<&str>,
    ) -> Option<String>;

    /// Remove one object. Returns whether the store acknowledged the deletion.
    async fn delete(&self, path: &str, bucket: &str) -> bool;

    /// Create every bucket in `names` that does not exist yet, as public.
    ///
    /// A failure on one bucket is logged and the rest are still attempted; the
    /// return value is `true` only if nothing failed.
    async fn ensure_buckets_exist(&self, names: &[&str]) -> bool;

    /// Public URL of an object.
    fn public_url(&self, bucket: &str, path: &str) -> String;
}
