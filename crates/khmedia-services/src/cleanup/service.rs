use khmedia_core::{Bucket, MediaOwner, MediaReference};
use khmedia_storage::keys::{extract_object_location, trailing_filename};
use khmedia_storage::{LocalStorage, RemoteStore};
use std::sync::Arc;

/// What a cleanup pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub local_deleted: bool,
    pub remote_attempted: bool,
    pub remote_deleted: bool,
}

impl CleanupReport {
    fn merge(self, other: CleanupReport) -> CleanupReport {
        CleanupReport {
            local_deleted: self.local_deleted || other.local_deleted,
            remote_attempted: self.remote_attempted || other.remote_attempted,
            remote_deleted: self.remote_deleted || other.remote_deleted,
        }
    }
}

/// Deletes the local file and remote object behind a media owner.
///
/// One instance serves every media kind; the kind only decides the fallback
/// bucket when a remote URL cannot be parsed. Failures are logged and never
/// returned, so a record delete always proceeds.
#[derive(Clone)]
pub struct MediaCleanup {
    local: LocalStorage,
    remote: Option<Arc<dyn RemoteStore>>,
}

impl MediaCleanup {
    pub fn new(local: LocalStorage, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self { local, remote }
    }

    /// Clean up every populated reference of `owner`, each exactly once.
    pub async fn cleanup(&self, owner: &MediaOwner) -> CleanupReport {
        let mut report = CleanupReport::default();
        for reference in owner.populated_references() {
            let step = self.cleanup_reference(owner.bucket(), &reference).await;
            report = report.merge(step);
        }

        tracing::info!(
            owner_id = %owner.id,
            kind = %owner.kind,
            local_deleted = report.local_deleted,
            remote_attempted = report.remote_attempted,
            remote_deleted = report.remote_deleted,
            "Media cleanup finished"
        );
        report
    }

    /// Clean up a single reference. `bucket` is used when a remote URL does
    /// not carry one.
    pub async fn cleanup_reference(
        &self,
        bucket: Bucket,
        reference: &MediaReference,
    ) -> CleanupReport {
        match reference {
            MediaReference::LocalPath(path) => CleanupReport {
                local_deleted: self.delete_local(path).await,
                ..Default::default()
            },
            MediaReference::RemoteUrl(url) => self.delete_remote(bucket, url).await,
            MediaReference::Unset => CleanupReport::default(),
        }
    }

    async fn delete_local(&self, path: &str) -> bool {
        match self.local.delete(path).await {
            Ok(deleted) => deleted,
            Err(e) => {
                tracing::error!(error = %e, path = %path, "Failed to delete local media file");
                false
            }
        }
    }

    async fn delete_remote(&self, bucket: Bucket, url: &str) -> CleanupReport {
        let Some(remote) = self.remote.as_ref() else {
            tracing::warn!(url = %url, "Remote storage not configured, cannot delete object");
            return CleanupReport::default();
        };

        let location = extract_object_location(url).or_else(|| {
            trailing_filename(url).map(|filename| (bucket.name().to_string(), filename))
        });

        let Some((bucket_name, path)) = location else {
            tracing::warn!(url = %url, "Could not derive object path from URL");
            return CleanupReport::default();
        };

        let deleted = remote.delete(&path, &bucket_name).await;
        CleanupReport {
            local_deleted: false,
            remote_attempted: true,
            remote_deleted: deleted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRemoteStore;
    use khmedia_core::MediaKind;
    use tempfile::TempDir;

    async fn setup() -> (TempDir, LocalStorage, Arc<MockRemoteStore>, MediaCleanup) {
        let dir = TempDir::new().unwrap();
        let local = LocalStorage::new(dir.path(), "/media/").await.unwrap();
        let remote = Arc::new(MockRemoteStore::new("https://abc.supabase.co"));
        let cleanup = MediaCleanup::new(local.clone(), Some(remote.clone() as Arc<dyn RemoteStore>));
        (dir, local, remote, cleanup)
    }

    #[tokio::test]
    async fn test_local_only_owner() {
        let (_dir, local, remote, cleanup) = setup().await;
        let path = local.save("festival/images", "holi.jpg", b"x").await.unwrap();
        let owner = MediaOwner::new(MediaKind::Celebration, "Holi").with_local_path(path.clone());

        let report = cleanup.cleanup(&owner).await;

        assert!(report.local_deleted);
        assert!(!report.remote_attempted);
        assert!(!local.exists(&path).await);
        assert!(remote.deleted().is_empty());
    }

    #[tokio::test]
    async fn test_remote_only_owner_deletes_exactly_once() {
        let (_dir, _local, remote, cleanup) = setup().await;
        let owner = MediaOwner::new(MediaKind::GalleryImage, "a").with_remote_url(
            "https://abc.supabase.co/storage/v1/object/public/gallery-images/annual-day-0a1b2c3d.jpg",
        );

        let report = cleanup.cleanup(&owner).await;

        assert!(report.remote_attempted);
        assert!(report.remote_deleted);
        assert_eq!(
            remote.deleted(),
            vec![(
                "gallery-images".to_string(),
                "annual-day-0a1b2c3d.jpg".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_url_bucket_wins_over_kind_bucket() {
        let (_dir, _local, remote, cleanup) = setup().await;
        // Photo stored in the gallery bucket even though its kind maps elsewhere
        let owner = MediaOwner::new(MediaKind::CelebrationPhoto, "p").with_remote_url(
            "https://abc.supabase.co/storage/v1/object/public/gallery-images/p.jpg",
        );
        cleanup.cleanup(&owner).await;
        assert_eq!(remote.deleted()[0].0, "gallery-images");
    }

    #[tokio::test]
    async fn test_unparseable_url_uses_kind_bucket() {
        let (_dir, _local, remote, cleanup) = setup().await;
        let owner = MediaOwner::new(MediaKind::CarouselImage, "s")
            .with_remote_url("https://cdn.example.com/uploads/slide.png");
        cleanup.cleanup(&owner).await;
        assert_eq!(
            remote.deleted(),
            vec![("carousel-images".to_string(), "slide.png".to_string())]
        );
    }

    #[tokio::test]
    async fn test_remote_failure_is_reported_not_raised() {
        let (_dir, _local, remote, cleanup) = setup().await;
        remote.set_failing(true);
        let owner = MediaOwner::new(MediaKind::BranchPhoto, "Kadi").with_remote_url(
            "https://abc.supabase.co/storage/v1/object/public/branch-photos/kadi.jpg",
        );

        let report = cleanup.cleanup(&owner).await;
        assert!(report.remote_attempted);
        assert!(!report.remote_deleted);
    }

    #[tokio::test]
    async fn test_missing_local_file_is_not_an_error() {
        let (_dir, _local, _remote, cleanup) = setup().await;
        let owner = MediaOwner::new(MediaKind::BranchPhoto, "Kadi")
            .with_local_path("branch_photos/never-existed.jpg");
        let report = cleanup.cleanup(&owner).await;
        assert_eq!(report, CleanupReport::default());
    }

    #[tokio::test]
    async fn test_without_remote_store() {
        let dir = TempDir::new().unwrap();
        let local = LocalStorage::new(dir.path(), "/media/").await.unwrap();
        let cleanup = MediaCleanup::new(local, None);
        let owner = MediaOwner::new(MediaKind::GalleryImage, "a")
            .with_remote_url("https://abc.supabase.co/storage/v1/object/public/gallery-images/a.jpg");
        let report = cleanup.cleanup(&owner).await;
        assert!(!report.remote_attempted);
    }
}
