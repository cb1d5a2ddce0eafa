#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

use std::io::Cursor;

pub fn to_bytes(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Opaque gradient, so lossy codecs have something to chew on.
pub fn rgb_gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    }))
}

/// Gradient whose alpha runs from transparent to opaque left to right.
pub fn rgba_gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([
            200,
            (y * 255 / height.max(1)) as u8,
            50,
            (x * 255 / width.max(1)) as u8,
        ])
    }))
}

/// A minimal valid file in `format`.
pub fn sample(format: ImageFormat) -> Vec<u8> {
    let img = match format {
        ImageFormat::Jpeg | ImageFormat::Bmp => rgb_gradient(16, 12),
        _ => rgba_gradient(16, 12),
    };
    to_bytes(&img, format)
}

pub const SOURCES: [ImageFormat; 5] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Tiff,
    ImageFormat::Gif,
];

pub const TARGETS: [&str; 5] = ["jpeg", "png", "bmp", "tiff", "gif"];

/// `ftyp` box with an HEIC major brand followed by a truncated `meta` box.
pub fn heic_header() -> Vec<u8> {
    let mut data = Vec::new();
    data.extend_from_slice(&24u32.to_be_bytes());
    data.extend_from_slice(b"ftyp");
    data.extend_from_slice(b"heic");
    data.extend_from_slice(&0u32.to_be_bytes());
    data.extend_from_slice(b"mif1");
    data.extend_from_slice(b"heic");
    data.extend_from_slice(&[0, 0, 0, 8, b'm', b'e', b't', b'a']);
    data
}
