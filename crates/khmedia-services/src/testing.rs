//! In-memory [`RemoteStore`] for tests.

use async_trait::async_trait;
use bytes::Bytes;
use khmedia_storage::keys::{generate_unique_filename, object_path};
use khmedia_storage::RemoteStore;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Records every call; can be switched into a failing mode.
#[derive(Debug, Default)]
pub struct MockRemoteStore {
    base_url: String,
    failing: AtomicBool,
    objects: Mutex<Vec<(String, String, Bytes)>>,
    deleted: Mutex<Vec<(String, String)>>,
    buckets: Mutex<HashSet<String>>,
}

impl MockRemoteStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn is_failing(&self) -> bool {
        self.failing.load(Ordering::SeqCst)
    }

    /// `(bucket, path, data)` of every stored object.
    pub fn uploaded(&self) -> Vec<(String, String, Bytes)> {
        self.objects.lock().map(|o| o.clone()).unwrap_or_default()
    }

    /// `(bucket, path)` of every delete call that was made.
    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.lock().map(|d| d.clone()).unwrap_or_default()
    }

    pub fn buckets(&self) -> HashSet<String> {
        self.buckets.lock().map(|b| b.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RemoteStore for MockRemoteStore {
    async fn upload(
        &self,
        data: Bytes,
        original_name: &str,
        _content_type: &str,
        bucket: &str,
        folder: Option<&str>,
    ) -> Option<String> {
        if self.is_failing() {
            return None;
        }
        let path = object_path(folder, &generate_unique_filename(original_name));
        if let Ok(mut objects) = self.objects.lock() {
            objects.push((bucket.to_string(), path.clone(), data));
        }
        Some(self.public_url(bucket, &path))
    }

    async fn delete(&self, path: &str, bucket: &str) -> bool {
        if let Ok(mut deleted) = self.deleted.lock() {
            deleted.push((bucket.to_string(), path.to_string()));
        }
        !self.is_failing()
    }

    async fn ensure_buckets_exist(&self, names: &[&str]) -> bool {
        if self.is_failing() {
            return false;
        }
        if let Ok(mut buckets) = self.buckets.lock() {
            buckets.extend(names.iter().map(|n| n.to_string()));
        }
        true
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url.trim_end_matches('/'),
            bucket,
            path
        )
    }
}
