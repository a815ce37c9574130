pub mod bucket;
pub mod media;

pub use bucket::{Bucket, ImageDimensions};
pub use media::{
    display_order, sort_for_display, MediaCategory, MediaKind, MediaOwner, MediaReference,
};
