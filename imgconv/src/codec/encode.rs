//! Image encoding: JPEG, PNG, BMP, TIFF, GIF

use std::io::Cursor;

use super::{normalize, DecodedImage, OutputFormat};
use crate::error::EncodeError;

/// Encode an image into `format` with that format's default settings.
///
/// Normalization for the target happens here; callers hand over the image
/// as decoded. Nothing is written to disk.
pub fn encode(image: &DecodedImage, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    let pixels = normalize::for_target(image, format)?;

    let (width, height) = image.dimensions();
    let mut buffer = Cursor::new(Vec::with_capacity((width as usize) * (height as usize)));

    pixels
        .write_to(&mut buffer, format.image_format())
        .map_err(|source| EncodeError::Codec { format, source })?;

    let bytes = buffer.into_inner();
    log::trace!("Encoded {width}x{height} {format}: {} bytes", bytes.len());
    Ok(bytes)
}

/// Encode into the format named by `target` (case-insensitive; `jpg` is accepted).
pub fn encode_as(image: &DecodedImage, target: &str) -> Result<Vec<u8>, EncodeError> {
    let format = OutputFormat::try_from(target)?;
    encode(image, format)
}
