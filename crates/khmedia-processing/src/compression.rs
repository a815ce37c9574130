use anyhow::Result;
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// JPEG quality used for every re-encoded photo.
pub const JPEG_QUALITY: u8 = 85;

/// MIME type for an image format.
pub fn mime_for_format(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::Tiff => "image/tiff",
        ImageFormat::Ico => "image/x-icon",
        ImageFormat::Avif => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Re-encodes decoded images in their original format.
pub struct ImageCompressor;

impl ImageCompressor {
    /// Encode `img` as `format`.
    ///
    /// JPEG uses quality 85, PNG uses the best compression level with adaptive
    /// filtering, and any other format goes through the codec's defaults.
    pub fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Bytes> {
        match format {
            ImageFormat::Jpeg => Self::encode_jpeg(img),
            ImageFormat::Png => Self::encode_png(img),
            other => {
                let mut buffer = Vec::new();
                img.write_to(&mut Cursor::new(&mut buffer), other)?;
                Ok(Bytes::from(buffer))
            }
        }
    }

    fn encode_jpeg(img: &DynamicImage) -> Result<Bytes> {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
        // JPEG has no alpha channel
        DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
        Ok(Bytes::from(buffer))
    }

    fn encode_png(img: &DynamicImage) -> Result<Bytes> {
        let mut buffer = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive);
        img.write_with_encoder(encoder)?;
        Ok(Bytes::from(buffer))
    }
}
