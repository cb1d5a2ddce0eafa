//! Image decoding

use image::{DynamicImage, ImageReader, Limits};

use std::io::Cursor;

use super::{ColorMode, DecodedImage};
use crate::error::DecodeError;
use crate::probe::{self, SourceFormat};
use crate::registry;

/// Decode an image from memory.
///
/// The container is detected from the bytes themselves. `filename_hint` is
/// advisory: a mismatching extension is logged and otherwise ignored.
/// The image is never truncated or downsampled. A header claiming a pixel
/// buffer over 4 GiB is rejected as corrupt before anything is allocated.
pub fn decode(bytes: &[u8], filename_hint: Option<&str>) -> Result<DecodedImage, DecodeError> {
    let format = SourceFormat::detect(bytes).ok_or(DecodeError::Unrecognized)?;

    if let Some(hinted) = filename_hint.and_then(hinted_format) {
        if hinted != format {
            log::debug!(
                "Filename hint {:?} suggests {hinted}, content is {format}",
                filename_hint.unwrap_or_default()
            );
        }
    }

    let pixels = match format.image_format() {
        Some(image_format) => decode_raster(bytes, format, image_format)?,
        None => decode_auxiliary(bytes, format)?,
    };

    let color_mode = ColorMode::classify(&pixels, probe::color_hint(bytes, format));
    log::debug!(
        "Decoded {format}: {}x{} {color_mode}",
        pixels.width(),
        pixels.height()
    );

    Ok(DecodedImage::new(format, color_mode, pixels))
}

/// Upper bound on the pixel buffer one decode may allocate.
const MAX_DECODE_ALLOC: u64 = 4 * 1024 * 1024 * 1024;

fn hinted_format(filename: &str) -> Option<SourceFormat> {
    let (_, ext) = filename.rsplit_once('.')?;
    SourceFormat::from_extension(ext)
}

fn decode_raster(
    bytes: &[u8],
    format: SourceFormat,
    image_format: image::ImageFormat,
) -> Result<DynamicImage, DecodeError> {
    let mut reader = ImageReader::with_format(Cursor::new(bytes), image_format);
    let mut limits = Limits::default();
    limits.max_alloc = Some(MAX_DECODE_ALLOC);
    reader.limits(limits);

    reader.decode().map_err(|e| DecodeError::Corrupt {
        format,
        source: Box::new(e),
    })
}

fn decode_auxiliary(bytes: &[u8], format: SourceFormat) -> Result<DynamicImage, DecodeError> {
    let codec = registry::decoder_for(format).ok_or(DecodeError::CodecNotRegistered(format))?;

    log::trace!("Decoding {format} with {}", codec.name());
    codec
        .decode(bytes)
        .map_err(|source| DecodeError::Corrupt { format, source })
}
