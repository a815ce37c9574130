//! Remote storage buckets and the image size each one is optimized for.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Maximum width/height an uploaded image is scaled down to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Target used when a bucket has no explicit size.
    pub const DEFAULT: ImageDimensions = ImageDimensions::new(1000, 1000);

    pub fn contains(&self, width: u32, height: u32) -> bool {
        width <= self.width && height <= self.height
    }
}

/// A named partition of the remote object store, one per media category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Carousel,
    Celebration,
    Gallery,
    GalleryThumbnail,
    Branch,
}

impl Bucket {
    pub const ALL: [Bucket; 5] = [
        Bucket::Carousel,
        Bucket::Celebration,
        Bucket::Gallery,
        Bucket::GalleryThumbnail,
        Bucket::Branch,
    ];

    /// Bucket name in the object store.
    pub fn name(self) -> &'static str {
        match self {
            Bucket::Carousel => "carousel-images",
            Bucket::Celebration => "celebration-images",
            Bucket::Gallery => "gallery-images",
            Bucket::GalleryThumbnail => "gallery-thumbnails",
            Bucket::Branch => "branch-photos",
        }
    }

    /// Target dimensions for images stored in this bucket.
    pub fn target_dimensions(self) -> ImageDimensions {
        match self {
            // Banner format with a fixed height
            Bucket::Carousel => ImageDimensions::new(1920, 600),
            Bucket::Celebration => ImageDimensions::new(800, 600),
            Bucket::Gallery => ImageDimensions::new(1200, 800),
            Bucket::GalleryThumbnail => ImageDimensions::new(400, 300),
            Bucket::Branch => ImageDimensions::DEFAULT,
        }
    }

    /// Look up a bucket by its store name.
    pub fn from_name(name: &str) -> Option<Bucket> {
        Bucket::ALL.into_iter().find(|b| b.name() == name)
    }

    /// Target dimensions for an arbitrary bucket name, falling back to the default.
    pub fn dimensions_for_name(name: &str) -> ImageDimensions {
        Bucket::from_name(name)
            .map(Bucket::target_dimensions)
            .unwrap_or(ImageDimensions::DEFAULT)
    }

    pub fn all_names() -> Vec<&'static str> {
        Bucket::ALL.iter().map(|b| b.name()).collect()
    }
}

impl FromStr for Bucket {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(bucket) = Bucket::from_name(s) {
            return Ok(bucket);
        }
        match s.to_lowercase().replace('-', "_").as_str() {
            "carousel" => Ok(Bucket::Carousel),
            "celebration" => Ok(Bucket::Celebration),
            "gallery" => Ok(Bucket::Gallery),
            "gallery_thumbnail" | "gallery_thumbnails" => Ok(Bucket::GalleryThumbnail),
            "branch" | "branch_photos" => Ok(Bucket::Branch),
            _ => Err(anyhow::anyhow!("Unknown bucket: {}", s)),
        }
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}
