//! Image processing module
//!
//! Bucket-aware downscaling of uploaded images (optimizer).

pub mod optimizer;

pub use optimizer::{ImageOptimizer, OptimizedImage};
