//! Administrative commands behind the `khmedia` binary.

use anyhow::{Context, Result};
use bytes::Bytes;
use khmedia_core::Bucket;
use khmedia_processing::ImageOptimizer;
use khmedia_storage::{extract_object_location, RemoteStore};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

#[derive(Debug, Serialize)]
pub struct BucketInitSummary {
    pub buckets: Vec<&'static str>,
    pub success: bool,
}

/// Create every media bucket the store is missing.
pub async fn init_buckets(store: &dyn RemoteStore) -> BucketInitSummary {
    let buckets = Bucket::all_names();
    let success = store.ensure_buckets_exist(&buckets).await;
    if !success {
        tracing::warn!(buckets = ?buckets, "Some buckets could not be created");
    }
    BucketInitSummary { buckets, success }
}

#[derive(Debug, Serialize)]
pub struct OptimizeSummary {
    pub output: PathBuf,
    pub bucket: String,
    pub original_bytes: usize,
    pub optimized_bytes: usize,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resized: bool,
}

/// `photo.jpg` becomes `photo.optimized.jpg` next to the input.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "image".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{}.optimized.{}", stem, ext.to_string_lossy()),
        None => format!("{}.optimized", stem),
    };
    input.with_file_name(name)
}

/// Optimize a file for `bucket` the same way uploads are.
pub async fn optimize_file(
    input: &Path,
    bucket: &str,
    output: Option<PathBuf>,
) -> Result<OptimizeSummary> {
    let bucket: Bucket = bucket.parse().with_context(|| {
        format!(
            "Unknown bucket; expected one of {}",
            Bucket::all_names().join(", ")
        )
    })?;

    let data = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let original_bytes = data.len();

    let optimized = ImageOptimizer::optimize(Bytes::from(data), bucket.name());
    let output = output.unwrap_or_else(|| default_output_path(input));
    tokio::fs::write(&output, &optimized.data)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        bucket = %bucket,
        original_bytes,
        optimized_bytes = optimized.data.len(),
        resized = optimized.resized,
        "Image optimized"
    );

    Ok(OptimizeSummary {
        output,
        bucket: bucket.name().to_string(),
        original_bytes,
        optimized_bytes: optimized.data.len(),
        width: optimized.width,
        height: optimized.height,
        resized: optimized.resized,
    })
}

#[derive(Debug, Serialize)]
pub struct PurgeSummary {
    pub bucket: String,
    pub path: String,
    pub deleted: bool,
}

/// Delete the remote object a public URL points at.
pub async fn purge_url(store: &dyn RemoteStore, url: &str) -> Result<PurgeSummary> {
    let (bucket, path) = extract_object_location(url)
        .with_context(|| format!("Not a public object URL: {}", url))?;
    let deleted = store.delete(&path, &bucket).await;
    tracing::info!(bucket = %bucket, path = %path, deleted, "Remote object purge finished");
    Ok(PurgeSummary {
        bucket,
        path,
        deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use khmedia_services::testing::MockRemoteStore;
    use tempfile::TempDir;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/tmp/photo.jpg")),
            PathBuf::from("/tmp/photo.optimized.jpg")
        );
        assert_eq!(
            default_output_path(Path::new("scan")),
            PathBuf::from("scan.optimized")
        );
    }

    #[tokio::test]
    async fn test_optimize_file_resizes_for_bucket() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("slide.png");
        DynamicImage::ImageRgb8(RgbImage::new(800, 800))
            .save_with_format(&input, ImageFormat::Png)
            .unwrap();

        let summary = optimize_file(&input, "gallery-thumbnails", None)
            .await
            .unwrap();
        assert!(summary.resized);
        assert_eq!(summary.output, dir.path().join("slide.optimized.png"));

        let written = image::open(&summary.output).unwrap();
        assert!(written.width() <= 400 && written.height() <= 300);
    }

    #[tokio::test]
    async fn test_optimize_file_rejects_unknown_bucket() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("a.jpg");
        assert!(optimize_file(&input, "posters", None).await.is_err());
    }

    #[tokio::test]
    async fn test_purge_url() {
        let store = MockRemoteStore::new("https://abc.supabase.co");
        let summary = purge_url(
            &store,
            "https://abc.supabase.co/storage/v1/object/public/carousel-images/slide-1a2b3c4d.jpg",
        )
        .await
        .unwrap();

        assert_eq!(summary.bucket, "carousel-images");
        assert_eq!(summary.path, "slide-1a2b3c4d.jpg");
        assert!(summary.deleted);
        assert_eq!(
            store.deleted(),
            vec![(
                "carousel-images".to_string(),
                "slide-1a2b3c4d.jpg".to_string()
            )]
        );

        assert!(purge_url(&store, "https://example.com/a.jpg").await.is_err());
    }

    #[tokio::test]
    async fn test_init_buckets() {
        let store = MockRemoteStore::new("https://abc.supabase.co");
        let summary = init_buckets(&store).await;
        assert!(summary.success);
        assert_eq!(store.buckets().len(), summary.buckets.len());
    }
}
