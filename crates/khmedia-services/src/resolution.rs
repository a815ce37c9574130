//! Read-time choice between an owner's local file and remote URL.

use khmedia_core::models::sort_for_display;
use khmedia_core::{MediaOwner, MediaReference, StoragePriority, StorageSource};
use khmedia_storage::LocalStorage;

/// Resolves the single URL an owner displays.
///
/// The candidate order comes from the configured [`StoragePriority`]; the first
/// non-empty candidate wins. A local path whose file is missing on disk is
/// treated as empty.
#[derive(Clone, Debug)]
pub struct StorageResolver {
    priority: StoragePriority,
    local: LocalStorage,
}

impl StorageResolver {
    pub fn new(priority: StoragePriority, local: LocalStorage) -> Self {
        Self { priority, local }
    }

    pub fn priority(&self) -> StoragePriority {
        self.priority
    }

    async fn candidate(&self, owner: &MediaOwner, source: StorageSource) -> Option<String> {
        match source {
            StorageSource::Local => match owner.local_reference() {
                MediaReference::LocalPath(path) => {
                    if self.local.exists(&path).await {
                        Some(self.local.url_for(&path))
                    } else {
                        tracing::debug!(
                            owner_id = %owner.id,
                            path = %path,
                            "Local media file missing, skipping"
                        );
                        None
                    }
                }
                _ => None,
            },
            StorageSource::Remote => match owner.remote_reference() {
                MediaReference::RemoteUrl(url) => Some(url),
                _ => None,
            },
        }
    }

    /// URL of the owner's own image, if any.
    pub async fn resolve(&self, owner: &MediaOwner) -> Option<String> {
        for source in self.priority.order() {
            if let Some(url) = self.candidate(owner, source).await {
                return Some(url);
            }
        }
        None
    }

    /// Like [`resolve`](Self::resolve), but a collection without its own image
    /// falls back to its first child in display order.
    pub async fn resolve_with_children(
        &self,
        owner: &MediaOwner,
        children: &[MediaOwner],
    ) -> Option<String> {
        if let Some(url) = self.resolve(owner).await {
            return Some(url);
        }

        if !owner.kind.is_collection() {
            return None;
        }

        let mut ordered = children.to_vec();
        sort_for_display(&mut ordered);
        match ordered.first() {
            Some(first) => self.resolve(first).await,
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khmedia_core::MediaKind;
    use tempfile::TempDir;

    const REMOTE: &str =
        "https://abc.supabase.co/storage/v1/object/public/carousel-images/slide-0a1b2c3d.jpg";

    async fn setup(priority: StoragePriority) -> (TempDir, LocalStorage, StorageResolver) {
        let dir = TempDir::new().unwrap();
        let local = LocalStorage::new(dir.path(), "/media/").await.unwrap();
        let resolver = StorageResolver::new(priority, local.clone());
        (dir, local, resolver)
    }

    #[tokio::test]
    async fn test_prefer_local_with_both_references() {
        let (_dir, local, resolver) = setup(StoragePriority::PreferLocal).await;
        let path = local.save("carousel/images", "slide.jpg", b"x").await.unwrap();
        let owner = MediaOwner::new(MediaKind::CarouselImage, "Slide")
            .with_local_path(path.clone())
            .with_remote_url(REMOTE);

        let url = resolver.resolve(&owner).await;
        assert_eq!(url, Some(format!("/media/{}", path)));
        // Unchanged state gives the same answer
        assert_eq!(resolver.resolve(&owner).await, url);
    }

    #[tokio::test]
    async fn test_prefer_remote_with_both_references() {
        let (_dir, local, resolver) = setup(StoragePriority::PreferRemote).await;
        let path = local.save("carousel/images", "slide.jpg", b"x").await.unwrap();
        let owner = MediaOwner::new(MediaKind::CarouselImage, "Slide")
            .with_local_path(path)
            .with_remote_url(REMOTE);

        assert_eq!(resolver.resolve(&owner).await.as_deref(), Some(REMOTE));
    }

    #[tokio::test]
    async fn test_missing_local_file_falls_through_to_remote() {
        let (_dir, _local, resolver) = setup(StoragePriority::PreferLocal).await;
        let owner = MediaOwner::new(MediaKind::BranchPhoto, "Kadi")
            .with_local_path("branch_photos/gone.jpg")
            .with_remote_url(REMOTE);
        assert_eq!(resolver.resolve(&owner).await.as_deref(), Some(REMOTE));

        let local_only =
            MediaOwner::new(MediaKind::BranchPhoto, "Kadi").with_local_path("branch_photos/gone.jpg");
        assert_eq!(resolver.resolve(&local_only).await, None);
    }

    #[tokio::test]
    async fn test_no_image_resolves_to_none() {
        let (_dir, _local, resolver) = setup(StoragePriority::PreferRemote).await;
        let owner = MediaOwner::new(MediaKind::CarouselImage, "Empty").with_remote_url("");
        assert_eq!(resolver.resolve(&owner).await, None);
    }

    #[tokio::test]
    async fn test_gallery_falls_back_to_first_ordered_child() {
        let (_dir, _local, resolver) = setup(StoragePriority::PreferLocal).await;
        let gallery = MediaOwner::new(MediaKind::Gallery, "Annual Day");
        let second = MediaOwner::new(MediaKind::GalleryImage, "b")
            .with_parent(gallery.id)
            .with_order(2)
            .with_remote_url("https://x.co/storage/v1/object/public/gallery-images/b.jpg");
        let first = MediaOwner::new(MediaKind::GalleryImage, "a")
            .with_parent(gallery.id)
            .with_order(1)
            .with_remote_url("https://x.co/storage/v1/object/public/gallery-images/a.jpg");

        let url = resolver
            .resolve_with_children(&gallery, &[second, first])
            .await;
        assert_eq!(
            url.as_deref(),
            Some("https://x.co/storage/v1/object/public/gallery-images/a.jpg")
        );

        assert_eq!(resolver.resolve_with_children(&gallery, &[]).await, None);
    }

    #[tokio::test]
    async fn test_own_image_beats_children() {
        let (_dir, _local, resolver) = setup(StoragePriority::PreferLocal).await;
        let celebration = MediaOwner::new(MediaKind::Celebration, "Holi").with_remote_url(REMOTE);
        let photo = MediaOwner::new(MediaKind::CelebrationPhoto, "p")
            .with_parent(celebration.id)
            .with_remote_url("https://x.co/storage/v1/object/public/celebration-images/p.jpg");

        assert_eq!(
            resolver
                .resolve_with_children(&celebration, &[photo])
                .await
                .as_deref(),
            Some(REMOTE)
        );
    }
}
