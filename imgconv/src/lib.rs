//! Single-image transcoding: decode anything (HEIC/HEIF included), re-encode
//! to JPEG, PNG, BMP, TIFF or GIF.
//!
//! ```no_run
//! imgconv::initialize_codecs();
//!
//! let bytes = std::fs::read("IMG_0001.heic")?;
//! let image = imgconv::decode(&bytes, Some("IMG_0001.heic"))?;
//! let png = imgconv::encode(&image, imgconv::OutputFormat::Png)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod probe;
pub mod registry;
pub mod upload;

// Re-export commonly used types
pub use codec::{decode, encode, encode_as, ColorMode, DecodedImage, OutputFormat};
pub use config::ConvertConfig;
pub use error::{ConversionError, DecodeError, EncodeError, UploadError};
pub use pipeline::{convert, convert_with_progress, Conversion, Converted, Stage};
pub use probe::SourceFormat;
pub use registry::initialize_codecs;
pub use upload::{attachment_name, SourceImageBytes};
