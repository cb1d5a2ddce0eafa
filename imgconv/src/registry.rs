//! Process-wide codec registration
//!
//! The baseline raster codecs are always available. HEIC/HEIF needs an
//! auxiliary codec that must be registered through [`initialize_codecs`]
//! before the first decode; until then HEIF input fails with
//! `DecodeError::CodecNotRegistered`. Once set, the registry is immutable,
//! so concurrent conversions read it without locking.

use image::DynamicImage;

use std::sync::OnceLock;

use crate::error::BoxError;
use crate::probe::SourceFormat;

/// A decoder for a container the raster codecs do not cover.
pub(crate) trait AuxiliaryDecoder: Send + Sync {
    fn name(&self) -> &'static str;

    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, BoxError>;
}

struct CodecRegistry {
    heif: Option<Box<dyn AuxiliaryDecoder>>,
}

impl CodecRegistry {
    fn compiled() -> Self {
        #[cfg(feature = "heif")]
        let heif: Option<Box<dyn AuxiliaryDecoder>> =
            Some(Box::new(crate::codec::heif::LibheifDecoder));
        #[cfg(not(feature = "heif"))]
        let heif: Option<Box<dyn AuxiliaryDecoder>> = None;

        CodecRegistry { heif }
    }
}

static REGISTRY: OnceLock<CodecRegistry> = OnceLock::new();

/// Register the auxiliary codecs. Call once at process start; repeat calls are no-ops.
pub fn initialize_codecs() {
    let mut first = false;
    let registry = REGISTRY.get_or_init(|| {
        first = true;
        CodecRegistry::compiled()
    });

    if first {
        match &registry.heif {
            Some(codec) => log::debug!("Registered HEIC/HEIF codec: {}", codec.name()),
            None => log::debug!("HEIC/HEIF codec not compiled in (enable the `heif` feature)"),
        }
    }
}

pub fn is_initialized() -> bool {
    REGISTRY.get().is_some()
}

/// Whether `format` can be decoded right now.
pub fn is_registered(format: SourceFormat) -> bool {
    match format {
        SourceFormat::Heif => decoder_for(format).is_some(),
        _ => true,
    }
}

pub(crate) fn decoder_for(format: SourceFormat) -> Option<&'static dyn AuxiliaryDecoder> {
    let registry = REGISTRY.get()?;
    match format {
        SourceFormat::Heif => registry.heif.as_deref(),
        _ => None,
    }
}
