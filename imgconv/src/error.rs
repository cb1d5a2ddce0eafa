//! Error types for the conversion pipeline
//!
//! Decode and encode failures are kept apart so a host can tell the user
//! which half of the conversion went wrong. Both are terminal: the pipeline
//! never retries and never falls back to another format.

use crate::codec::{ColorMode, OutputFormat};
use crate::probe::SourceFormat;

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Input bytes could not be turned into pixels.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unrecognized or corrupt data")]
    Unrecognized,

    #[error("unrecognized or corrupt data: {format} stream failed to decode: {source}")]
    Corrupt {
        format: SourceFormat,
        #[source]
        source: BoxError,
    },

    #[error("unrecognized or corrupt data: no codec registered for {0}")]
    CodecNotRegistered(SourceFormat),
}

impl DecodeError {
    pub const REASON: &'static str = "unrecognized or corrupt data";

    pub fn reason(&self) -> &'static str {
        Self::REASON
    }
}

/// Pixels could not be serialized into the requested container.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error(
        "incompatible mode or unsupported target: `{0}` is not one of jpeg, png, bmp, tiff, gif"
    )]
    UnsupportedTarget(String),

    #[error("incompatible mode or unsupported target: {format} cannot store {mode} pixels")]
    IncompatibleMode {
        mode: ColorMode,
        format: OutputFormat,
    },

    #[error("incompatible mode or unsupported target: {format} encoder failed: {source}")]
    Codec {
        format: OutputFormat,
        #[source]
        source: image::ImageError,
    },
}

impl EncodeError {
    pub const REASON: &'static str = "incompatible mode or unsupported target";

    pub fn reason(&self) -> &'static str {
        Self::REASON
    }
}

/// Outcome of a failed decode → encode run.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

impl ConversionError {
    pub fn reason(&self) -> &'static str {
        match self {
            ConversionError::Decode(e) => e.reason(),
            ConversionError::Encode(e) => e.reason(),
        }
    }
}

/// A host-side upload payload that is not usable as image bytes.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file to convert!")]
    Empty,

    #[error("data URL is missing the `;base64,` marker")]
    MissingBase64Marker,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}
