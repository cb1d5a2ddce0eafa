//! Upload payloads in, attachment names out
//!
//! Browser upload widgets hand over `data:image/png;base64,...` URLs; other
//! hosts send plain base64 or raw bytes. Either way the bytes belong to the
//! caller until they are handed to the pipeline.

use base64::{engine::general_purpose, Engine as _};

use crate::codec::OutputFormat;
use crate::error::UploadError;

/// Used when the upload carried no usable file name.
const FALLBACK_BASENAME: &str = "converted_image";

/// Raw image bytes plus an optional original file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImageBytes {
    bytes: Vec<u8>,
    filename: Option<String>,
}

impl SourceImageBytes {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Parse a data URL (`data:<mime>;base64,<payload>`) or a bare base64 string.
    ///
    /// `filename` is the name the upload widget reported, if any.
    pub fn from_base64(payload: &str, filename: Option<&str>) -> Result<Self, UploadError> {
        let normalized = payload.trim();

        let encoded = if normalized.starts_with("data:") {
            let start = normalized
                .find(";base64,")
                .ok_or(UploadError::MissingBase64Marker)?;
            &normalized[start + ";base64,".len()..]
        } else {
            normalized
        };

        if encoded.is_empty() {
            return Err(UploadError::Empty);
        }

        let bytes = general_purpose::STANDARD.decode(encoded)?;
        log::trace!("Decoded base64 upload: {} bytes", bytes.len());
        Ok(Self {
            bytes,
            filename: filename.map(str::to_string),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }
}

/// `<original-basename>.<format>` for a converted download.
///
/// Directories (either separator) and the last extension are stripped;
/// inner dots are kept.
pub fn attachment_name(original: Option<&str>, format: OutputFormat) -> String {
    let basename = original.map(basename).unwrap_or_default();
    let basename = if basename.trim().is_empty() {
        FALLBACK_BASENAME
    } else {
        basename
    };

    // don't use Path::with_extension, it would cut at the first dot for some names
    let mut name = String::with_capacity(basename.len() + 5);
    name.push_str(basename);
    name.push('.');
    name.push_str(format.extension());
    name
}

fn basename(path: &str) -> &str {
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    }
}
