//! HEIC/HEIF decoding through libheif

use image::{DynamicImage, RgbImage, RgbaImage};
use libheif_rs::{ColorSpace, HeifContext, LibHeif, RgbChroma};

use crate::error::BoxError;
use crate::registry::AuxiliaryDecoder;

pub(crate) struct LibheifDecoder;

impl AuxiliaryDecoder for LibheifDecoder {
    fn name(&self) -> &'static str {
        "libheif"
    }

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BoxError> {
        let lib = LibHeif::new();
        let ctx = HeifContext::read_from_bytes(bytes)?;
        let handle = ctx.primary_image_handle()?;

        let alpha = handle.has_alpha_channel();
        let (chroma, channels) = if alpha {
            (RgbChroma::Rgba, 4)
        } else {
            (RgbChroma::Rgb, 3)
        };
        let image = lib.decode(&handle, ColorSpace::Rgb(chroma), None)?;

        let planes = image.planes();
        let plane = planes
            .interleaved
            .ok_or("libheif returned no interleaved plane")?;

        let (width, height) = (plane.width, plane.height);
        let row_len = width as usize * channels;
        if plane.stride < row_len {
            return Err("libheif plane stride is shorter than a row".into());
        }

        // rows may be padded to `stride`
        let mut buf = Vec::with_capacity(row_len * height as usize);
        for row in plane.data.chunks(plane.stride).take(height as usize) {
            buf.extend_from_slice(row.get(..row_len).ok_or("truncated HEIF row")?);
        }

        let pixels = if alpha {
            RgbaImage::from_raw(width, height, buf).map(DynamicImage::ImageRgba8)
        } else {
            RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8)
        };

        pixels.ok_or_else(|| "decoded HEIF plane is shorter than its dimensions".into())
    }
}
