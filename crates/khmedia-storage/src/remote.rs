//! Supabase Storage compatible REST client.

use crate::keys::{encode_path, generate_unique_filename, object_path};
use crate::traits::{RemoteStore, StorageError, StorageResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashSet;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::{Duration, Instant};

#[derive(Debug, Deserialize)]
struct BucketInfo {
    #[serde(default)]
    id: Option<String>,
    name: String,
}

/// Remote object store client
#[derive(Clone)]
pub struct SupabaseStorage {
    client: Client,
    base_url: String,
    key: String,
}

impl Debug for SupabaseStorage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SupabaseStorage")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl SupabaseStorage {
    /// Create a client for the store at `base_url` authenticated with `key`.
    ///
    /// Every request is bounded by `timeout`; an elapsed timeout is reported as
    /// an ordinary failure.
    pub fn new(
        base_url: impl Into<String>,
        key: impl Into<String>,
        timeout: Duration,
    ) -> StorageResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            StorageError::ConfigError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("authorization", format!("Bearer {}", self.key))
            .header("apikey", &self.key)
    }

    async fn check(response: Response) -> StorageResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(StorageError::UnexpectedStatus {
            status: status.as_u16(),
            body,
        })
    }

    async fn try_upload(
        &self,
        data: Bytes,
        path: &str,
        content_type: &str,
        bucket: &str,
    ) -> StorageResult<()> {
        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url,
            bucket,
            encode_path(path)
        );
        let response = self
            .authorized(self.client.post(url))
            .header("content-type", content_type)
            .body(data)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn try_delete(&self, path: &str, bucket: &str) -> StorageResult<()> {
        let url = format!("{}/storage/v1/object/{}", self.base_url, bucket);
        let response = self
            .authorized(self.client.delete(url))
            .json(&json!({ "prefixes": [path] }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// Names of every bucket currently in the store.
    pub async fn list_buckets(&self) -> StorageResult<Vec<String>> {
        let url = format!("{}/storage/v1/bucket", self.base_url);
        let response = self.authorized(self.client.get(url)).send().await?;
        let buckets: Vec<BucketInfo> = Self::check(response).await?.json().await?;
        Ok(buckets
            .into_iter()
            .map(|b| b.id.unwrap_or(b.name))
            .collect())
    }

    async fn create_bucket(&self, name: &str) -> StorageResult<()> {
        let url = format!("{}/storage/v1/bucket", self.base_url);
        let response = self
            .authorized(self.client.post(url))
            .json(&json!({ "id": name, "name": name, "public": true }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for SupabaseStorage {
    async fn upload(
        &self,
        data: Bytes,
        original_name: &str,
        content_type: &str,
        bucket: &str,
        folder: Option<&str>,
    ) -> Option<String> {
        let path = object_path(folder, &generate_unique_filename(original_name));
        let size = data.len();
        let start = Instant::now();

        match self.try_upload(data, &path, content_type, bucket).await {
            Ok(()) => {
                tracing::info!(
                    bucket = %bucket,
                    path = %path,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Remote upload successful"
                );
                Some(self.public_url(bucket, &path))
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %bucket,
                    path = %path,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Remote upload failed"
                );
                None
            }
        }
    }

    async fn delete(&self, path: &str, bucket: &str) -> bool {
        match self.try_delete(path, bucket).await {
            Ok(()) => {
                tracing::info!(bucket = %bucket, path = %path, "Remote object deleted");
                true
            }
            Err(e) => {
                tracing::error!(error = %e, bucket = %bucket, path = %path, "Remote delete failed");
                false
            }
        }
    }

    async fn ensure_buckets_exist(&self, names: &[&str]) -> bool {
        let existing: HashSet<String> = match self.list_buckets().await {
            Ok(list) => list.into_iter().collect(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to list remote buckets");
                return false;
            }
        };

        let mut all_ok = true;
        for name in names.iter().filter(|n| !existing.contains(**n)) {
            match self.create_bucket(name).await {
                Ok(()) => tracing::info!(bucket = %name, "Created remote bucket"),
                Err(e) => {
                    tracing::error!(error = %e, bucket = %name, "Failed to create remote bucket");
                    all_ok = false;
                }
            }
        }

        all_ok
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url,
            bucket,
            path.trim_start_matches('/')
        )
    }
}
