//! Bucket-aware image optimizer.
//!
//! Uploaded images are shrunk to fit inside the target box of the bucket they
//! are stored in, keeping the aspect ratio, and re-encoded in their original
//! format. Images already inside the box are passed through byte for byte.

use crate::compression::{mime_for_format, ImageCompressor};
use anyhow::{anyhow, Result};
use bytes::Bytes;
use image::imageops::FilterType;
use image::{GenericImageView, ImageFormat, ImageReader};
use khmedia_core::{Bucket, ImageDimensions};
use std::io::Cursor;

/// Result of optimizing one image.
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    pub data: Bytes,
    pub content_type: String,
    /// Final dimensions, `None` when the input could not be decoded.
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resized: bool,
}

impl OptimizedImage {
    fn passthrough(data: Bytes, format: Option<ImageFormat>, dims: Option<(u32, u32)>) -> Self {
        Self {
            data,
            content_type: format
                .map(mime_for_format)
                .unwrap_or("application/octet-stream")
                .to_string(),
            width: dims.map(|d| d.0),
            height: dims.map(|d| d.1),
            resized: false,
        }
    }
}

pub struct ImageOptimizer;

impl ImageOptimizer {
    /// Optimize `data` for the bucket named `bucket_name`.
    ///
    /// Never fails: an undecodable image or an encoder error returns the
    /// input unchanged and logs a warning.
    pub fn optimize(data: Bytes, bucket_name: &str) -> OptimizedImage {
        let target = Bucket::dimensions_for_name(bucket_name);
        let start = std::time::Instant::now();

        match Self::try_optimize(&data, target) {
            Ok(Some(optimized)) => {
                tracing::info!(
                    bucket = %bucket_name,
                    original_size = data.len(),
                    optimized_size = optimized.data.len(),
                    width = optimized.width,
                    height = optimized.height,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Image resized for bucket"
                );
                optimized
            }
            Ok(None) => {
                let format = image::guess_format(&data).ok();
                let dims = Self::dimensions(&data);
                tracing::debug!(bucket = %bucket_name, "Image within target size, stored as-is");
                OptimizedImage::passthrough(data, format, dims)
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    bucket = %bucket_name,
                    "Image optimization failed, keeping original bytes"
                );
                let format = image::guess_format(&data).ok();
                OptimizedImage::passthrough(data, format, None)
            }
        }
    }

    /// `Ok(None)` means the image already fits.
    fn try_optimize(data: &[u8], target: ImageDimensions) -> Result<Option<OptimizedImage>> {
        let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
        let format = reader
            .format()
            .ok_or_else(|| anyhow!("Unrecognized image format"))?;
        let img = reader.decode()?;
        let (width, height) = img.dimensions();

        if target.contains(width, height) {
            return Ok(None);
        }

        let (new_width, new_height) = Self::fit_within(width, height, target);
        let resized = img.resize_exact(new_width, new_height, FilterType::Lanczos3);
        let encoded = ImageCompressor::encode(&resized, format)?;

        Ok(Some(OptimizedImage {
            data: encoded,
            content_type: mime_for_format(format).to_string(),
            width: Some(new_width),
            height: Some(new_height),
            resized: true,
        }))
    }

    /// Largest size with the same aspect ratio that fits inside `target`.
    /// Each side is floored and kept at least 1 pixel.
    pub fn fit_within(width: u32, height: u32, target: ImageDimensions) -> (u32, u32) {
        let (w, h) = (width as u64, height as u64);
        let (tw, th) = (target.width as u64, target.height as u64);
        // Compare tw/w against th/h without floating point
        let (new_width, new_height) = if tw * h <= th * w {
            (tw, h * tw / w)
        } else {
            (w * th / h, th)
        };
        ((new_width as u32).max(1), (new_height as u32).max(1))
    }

    fn dimensions(data: &[u8]) -> Option<(u32, u32)> {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .ok()?
            .into_dimensions()
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn encode(width: u32, height: u32, format: ImageFormat) -> Bytes {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        }));
        ImageCompressor::encode(&img, format).unwrap()
    }

    #[test]
    fn test_fit_within() {
        let target = ImageDimensions::new(1200, 800);
        assert_eq!(ImageOptimizer::fit_within(4000, 3000, target), (1066, 800));
        assert_eq!(ImageOptimizer::fit_within(3000, 2000, target), (1200, 800));
        assert_eq!(
            ImageOptimizer::fit_within(10000, 1, ImageDimensions::new(400, 300)),
            (400, 1)
        );
    }

    #[test]
    fn test_small_image_passes_through_unchanged() {
        let data = encode(300, 200, ImageFormat::Jpeg);
        let result = ImageOptimizer::optimize(data.clone(), "gallery-images");
        assert_eq!(result.data, data);
        assert!(!result.resized);
        assert_eq!(result.content_type, "image/jpeg");
        assert_eq!(result.width, Some(300));
    }

    #[test]
    fn test_large_jpeg_is_downscaled_for_gallery() {
        let data = encode(2400, 1800, ImageFormat::Jpeg);
        let result = ImageOptimizer::optimize(data, "gallery-images");
        assert!(result.resized);
        assert_eq!(result.content_type, "image/jpeg");

        let decoded = image::load_from_memory(&result.data).unwrap();
        let (w, h) = decoded.dimensions();
        assert!(w <= 1200 && h <= 800);
        let original_ratio = 2400.0 / 1800.0;
        let ratio = w as f64 / h as f64;
        assert!((ratio - original_ratio).abs() < 0.01);
    }

    #[test]
    fn test_4000x3000_photo_fits_gallery_box() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4000, 3000, image::Rgb([40, 90, 160])));
        let data = ImageCompressor::encode(&img, ImageFormat::Jpeg).unwrap();

        let result = ImageOptimizer::optimize(data, "gallery-images");
        assert!(result.resized);
        assert_eq!((result.width, result.height), (Some(1066), Some(800)));

        let decoded = image::load_from_memory(&result.data).unwrap();
        assert_eq!(decoded.dimensions(), (1066, 800));
    }

    #[test]
    fn test_bmp_is_resized_and_stays_bmp() {
        let data = encode(2000, 1000, ImageFormat::Bmp);
        let result = ImageOptimizer::optimize(data, "carousel-images");
        assert!(result.resized);
        assert_eq!(result.content_type, "image/bmp");

        let decoded = image::load_from_memory(&result.data).unwrap();
        assert_eq!(decoded.dimensions(), (1200, 600));
    }

    #[test]
    fn test_png_stays_png() {
        let data = encode(900, 900, ImageFormat::Png);
        let result = ImageOptimizer::optimize(data, "gallery-thumbnails");
        assert_eq!(result.content_type, "image/png");
        assert_eq!(result.width, Some(300));
        assert_eq!(result.height, Some(300));
    }

    #[test]
    fn test_unknown_bucket_uses_default_box() {
        let data = encode(1500, 500, ImageFormat::Png);
        let result = ImageOptimizer::optimize(data, "misc");
        assert_eq!(result.width, Some(1000));
        assert_eq!(result.height, Some(333));
    }

    #[test]
    fn test_garbage_is_returned_unchanged() {
        let data = Bytes::from_static(b"definitely not an image");
        let result = ImageOptimizer::optimize(data.clone(), "carousel-images");
        assert_eq!(result.data, data);
        assert!(!result.resized);
        assert_eq!(result.width, None);
    }
}
