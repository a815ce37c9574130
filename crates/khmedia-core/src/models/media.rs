//! Media owners: every site record that carries an image.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

use super::bucket::Bucket;

/// Kind of record holding an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Celebration,
    CelebrationPhoto,
    Gallery,
    GalleryImage,
    CarouselImage,
    BranchPhoto,
}

impl MediaKind {
    pub const ALL: [MediaKind; 6] = [
        MediaKind::Celebration,
        MediaKind::CelebrationPhoto,
        MediaKind::Gallery,
        MediaKind::GalleryImage,
        MediaKind::CarouselImage,
        MediaKind::BranchPhoto,
    ];

    /// Remote bucket this kind uploads to.
    pub fn bucket(self) -> Bucket {
        match self {
            MediaKind::Celebration | MediaKind::CelebrationPhoto => Bucket::Celebration,
            MediaKind::Gallery => Bucket::GalleryThumbnail,
            MediaKind::GalleryImage => Bucket::Gallery,
            MediaKind::CarouselImage => Bucket::Carousel,
            MediaKind::BranchPhoto => Bucket::Branch,
        }
    }

    /// Sub-folder under the media root for locally stored files.
    pub fn local_folder(self) -> &'static str {
        match self {
            MediaKind::Celebration => "festival/images",
            MediaKind::CelebrationPhoto => "festival/gallery",
            MediaKind::Gallery => "gallery/thumbnails",
            MediaKind::GalleryImage => "gallery/images",
            MediaKind::CarouselImage => "carousel/images",
            MediaKind::BranchPhoto => "branch_photos",
        }
    }

    /// Kind of the children for collection kinds.
    pub fn child_kind(self) -> Option<MediaKind> {
        match self {
            MediaKind::Celebration => Some(MediaKind::CelebrationPhoto),
            MediaKind::Gallery => Some(MediaKind::GalleryImage),
            _ => None,
        }
    }

    /// Kind of the parent for child kinds.
    pub fn parent_kind(self) -> Option<MediaKind> {
        match self {
            MediaKind::CelebrationPhoto => Some(MediaKind::Celebration),
            MediaKind::GalleryImage => Some(MediaKind::Gallery),
            _ => None,
        }
    }

    pub fn is_collection(self) -> bool {
        self.child_kind().is_some()
    }

    /// Category a new record of this kind starts with.
    pub fn default_category(self) -> Option<MediaCategory> {
        match self {
            MediaKind::Celebration => Some(MediaCategory::Festival),
            MediaKind::Gallery => Some(MediaCategory::Other),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Celebration => "celebration",
            MediaKind::CelebrationPhoto => "celebration_photo",
            MediaKind::Gallery => "gallery",
            MediaKind::GalleryImage => "gallery_image",
            MediaKind::CarouselImage => "carousel_image",
            MediaKind::BranchPhoto => "branch_photo",
        }
    }
}

impl FromStr for MediaKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        MediaKind::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Invalid media kind: {}", s))
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Category of a celebration or gallery, used to filter public listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    Festival,
    Event,
    Sports,
    Cultural,
    Academic,
    Other,
}

impl MediaCategory {
    pub const ALL: [MediaCategory; 6] = [
        MediaCategory::Festival,
        MediaCategory::Event,
        MediaCategory::Sports,
        MediaCategory::Cultural,
        MediaCategory::Academic,
        MediaCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaCategory::Festival => "festival",
            MediaCategory::Event => "event",
            MediaCategory::Sports => "sports",
            MediaCategory::Cultural => "cultural",
            MediaCategory::Academic => "academic",
            MediaCategory::Other => "other",
        }
    }
}

impl FromStr for MediaCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        MediaCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| anyhow::anyhow!("Invalid category: {}", s))
    }
}

impl Display for MediaCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Where an owner's image lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MediaReference {
    /// Path relative to the media root.
    LocalPath(String),
    /// Public URL of a remote object.
    RemoteUrl(String),
    Unset,
}

impl MediaReference {
    pub fn is_set(&self) -> bool {
        !matches!(self, MediaReference::Unset)
    }
}

/// A record that owns an image: a celebration, one of its photos, a gallery,
/// a gallery image, a carousel slide or a branch photo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaOwner {
    pub id: Uuid,
    pub kind: MediaKind,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub caption: Option<String>,
    pub order: i32,
    pub uploaded_at: DateTime<Utc>,
    pub local_path: Option<String>,
    pub remote_url: Option<String>,
    /// Hidden from public listings when false.
    pub active: bool,
    /// Shown on the homepage.
    pub featured: bool,
    /// Collections only.
    pub category: Option<MediaCategory>,
    /// Event date of a celebration or creation date of a gallery.
    pub date: Option<DateTime<Utc>>,
}

impl MediaOwner {
    pub fn new(kind: MediaKind, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            parent_id: None,
            title: title.into(),
            caption: None,
            order: 0,
            uploaded_at: Utc::now(),
            local_path: None,
            remote_url: None,
            active: true,
            featured: false,
            category: kind.default_category(),
            date: kind.is_collection().then(Utc::now),
        }
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_featured(mut self, featured: bool) -> Self {
        self.featured = featured;
        self
    }

    pub fn with_category(mut self, category: MediaCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Date collections are listed by, newest first.
    pub fn listing_date(&self) -> DateTime<Utc> {
        self.date.unwrap_or(self.uploaded_at)
    }

    pub fn with_local_path(mut self, path: impl Into<String>) -> Self {
        self.local_path = Some(path.into());
        self
    }

    pub fn with_remote_url(mut self, url: impl Into<String>) -> Self {
        self.remote_url = Some(url.into());
        self
    }

    pub fn bucket(&self) -> Bucket {
        self.kind.bucket()
    }

    /// Local reference, treating an empty path as unset.
    pub fn local_reference(&self) -> MediaReference {
        match self.local_path.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => MediaReference::LocalPath(path.to_string()),
            _ => MediaReference::Unset,
        }
    }

    /// Remote reference, treating an empty URL as unset.
    pub fn remote_reference(&self) -> MediaReference {
        match self.remote_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => MediaReference::RemoteUrl(url.to_string()),
            _ => MediaReference::Unset,
        }
    }

    /// Every populated reference, local first.
    pub fn populated_references(&self) -> Vec<MediaReference> {
        [self.local_reference(), self.remote_reference()]
            .into_iter()
            .filter(MediaReference::is_set)
            .collect()
    }

    pub fn has_image(&self) -> bool {
        !self.populated_references().is_empty()
    }

    /// Store a new reference, clearing the other slot.
    pub fn set_reference(&mut self, reference: MediaReference) {
        match reference {
            MediaReference::LocalPath(path) => {
                self.local_path = Some(path);
                self.remote_url = None;
            }
            MediaReference::RemoteUrl(url) => {
                self.remote_url = Some(url);
                self.local_path = None;
            }
            MediaReference::Unset => {
                self.local_path = None;
                self.remote_url = None;
            }
        }
    }
}

/// Display order.
///
/// Collections are listed newest date first. Everything else, children
/// included, goes by `order` ascending with the newest upload first on ties.
pub fn display_order(a: &MediaOwner, b: &MediaOwner) -> Ordering {
    if a.kind.is_collection() && b.kind.is_collection() {
        return b
            .listing_date()
            .cmp(&a.listing_date())
            .then_with(|| a.order.cmp(&b.order));
    }
    a.order
        .cmp(&b.order)
        .then_with(|| b.uploaded_at.cmp(&a.uploaded_at))
}

pub fn sort_for_display(items: &mut [MediaOwner]) {
    items.sort_by(display_order);
}
