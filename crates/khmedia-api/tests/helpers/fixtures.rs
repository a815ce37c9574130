//! Test fixtures: encoded images and multipart forms.

use axum_test::multipart::{MultipartForm, Part};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

/// Black JPEG of the given size.
pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .expect("Failed to encode test JPEG");
    buffer
}

pub fn image_part(filename: &str, data: Vec<u8>) -> Part {
    Part::bytes(data)
        .file_name(filename.to_string())
        .mime_type("image/jpeg")
}

/// Form with the text fields of a new record and an optional image.
pub fn media_form(fields: &[(&str, &str)], file: Option<(&str, Vec<u8>)>) -> MultipartForm {
    let mut form = MultipartForm::new();
    for (name, value) in fields {
        form = form.add_text(name.to_string(), value.to_string());
    }
    if let Some((filename, data)) = file {
        form = form.add_part("file", image_part(filename, data));
    }
    form
}
