//! Mode normalization ahead of encoding
//!
//! Two steps, always in this order:
//! 1. alpha flattening: an image with alpha headed for a format without it
//!    is composited onto opaque white
//! 2. layout: the buffer is converted to a pixel layout the target's encoder
//!    accepts (8-bit gray/RGB/RGBA, 16-bit kept where PNG and TIFF take it)
//!
//! Dimensions never change.

use image::{
    ColorType, DynamicImage, GrayAlphaImage, GrayImage, LumaA, Rgb, RgbImage, Rgba, RgbaImage,
};

use std::borrow::Cow;

use super::{DecodedImage, OutputFormat};
use crate::error::EncodeError;

const BACKGROUND: u8 = 255;

/// Produce pixels the encoder for `format` accepts as-is.
pub(super) fn for_target(
    image: &DecodedImage,
    format: OutputFormat,
) -> Result<Cow<'_, DynamicImage>, EncodeError> {
    let pixels = image.pixels();

    let flattened = if pixels.color().has_alpha() && !format.supports_alpha() {
        log::debug!("Flattening {} alpha for {format}", image.color_mode());
        Cow::Owned(flatten_alpha(pixels))
    } else {
        Cow::Borrowed(pixels)
    };

    let current = flattened.color();
    let Some(target) = accepted_layout(format, current) else {
        return Err(EncodeError::IncompatibleMode {
            mode: image.color_mode(),
            format,
        });
    };

    if target == current {
        return Ok(flattened);
    }

    log::trace!("Converting {current:?} to {target:?} for {format}");
    Ok(Cow::Owned(convert(&flattened, target)))
}

/// The layout `format` should receive for a buffer currently in `color`.
fn accepted_layout(format: OutputFormat, color: ColorType) -> Option<ColorType> {
    use ColorType::*;

    let layout = match (format, color) {
        // 8-bit only, no alpha
        (OutputFormat::Jpeg | OutputFormat::Bmp, L8 | L16) => L8,
        (OutputFormat::Jpeg | OutputFormat::Bmp, La8 | La16) => L8,
        (OutputFormat::Jpeg | OutputFormat::Bmp, Rgb8 | Rgb16 | Rgb32F) => Rgb8,
        (OutputFormat::Jpeg | OutputFormat::Bmp, Rgba8 | Rgba16 | Rgba32F) => Rgb8,

        (OutputFormat::Png, L8 | La8 | Rgb8 | Rgba8 | L16 | La16 | Rgb16 | Rgba16) => color,
        (OutputFormat::Png, Rgb32F) => Rgb16,
        (OutputFormat::Png, Rgba32F) => Rgba16,

        (OutputFormat::Tiff, L8 | Rgb8 | Rgba8 | L16 | Rgb16 | Rgba16) => color,
        (OutputFormat::Tiff, La8 | La16) => Rgba8,
        (OutputFormat::Tiff, Rgb32F) => Rgb16,
        (OutputFormat::Tiff, Rgba32F) => Rgba16,

        // the GIF quantizer works on 8-bit RGB(A)
        (OutputFormat::Gif, L8 | L16 | Rgb8 | Rgb16 | Rgb32F) => Rgb8,
        (OutputFormat::Gif, La8 | La16 | Rgba8 | Rgba16 | Rgba32F) => Rgba8,

        _ => return None,
    };

    Some(layout)
}

fn convert(pixels: &DynamicImage, target: ColorType) -> DynamicImage {
    match target {
        ColorType::L8 => DynamicImage::ImageLuma8(pixels.to_luma8()),
        ColorType::La8 => DynamicImage::ImageLumaA8(pixels.to_luma_alpha8()),
        ColorType::Rgb8 => DynamicImage::ImageRgb8(pixels.to_rgb8()),
        ColorType::L16 => DynamicImage::ImageLuma16(pixels.to_luma16()),
        ColorType::La16 => DynamicImage::ImageLumaA16(pixels.to_luma_alpha16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(pixels.to_rgb16()),
        ColorType::Rgba16 => DynamicImage::ImageRgba16(pixels.to_rgba16()),
        _ => DynamicImage::ImageRgba8(pixels.to_rgba8()),
    }
}

/// Composite onto an opaque white background.
///
/// Gray inputs stay gray; everything else becomes 8-bit RGB.
fn flatten_alpha(pixels: &DynamicImage) -> DynamicImage {
    match pixels {
        DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_) => {
            DynamicImage::ImageLuma8(flatten_gray(&pixels.to_luma_alpha8()))
        }
        _ => DynamicImage::ImageRgb8(flatten_rgba(&pixels.to_rgba8())),
    }
}

fn flatten_rgba(rgba: &RgbaImage) -> RgbImage {
    let (width, height) = rgba.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        Rgb([blend(r, a), blend(g, a), blend(b, a)])
    })
}

fn flatten_gray(gray: &GrayAlphaImage) -> GrayImage {
    let (width, height) = gray.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        let LumaA([l, a]) = *gray.get_pixel(x, y);
        image::Luma([blend(l, a)])
    })
}

#[inline]
fn blend(channel: u8, alpha: u8) -> u8 {
    let (c, a) = (channel as u32, alpha as u32);
    ((c * a + BACKGROUND as u32 * (255 - a) + 127) / 255) as u8
}
