//! khmedia Processing Library
//!
//! Image work done before anything is stored: upload validation, downscaling
//! to the bucket's target size and re-encoding.

pub mod compression;
pub mod image;
pub mod validator;

pub use compression::{mime_for_format, ImageCompressor, JPEG_QUALITY};
pub use image::{ImageOptimizer, OptimizedImage};
pub use validator::{MediaValidator, ValidationError};
