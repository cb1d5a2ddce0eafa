//! One conversion request: Idle → Decoding → Encoding → Succeeded | Failed
//!
//! Every call is an independent run with nothing shared between runs, so
//! hosts may call [`convert`] from as many workers as they like once
//! [`initialize_codecs`](crate::initialize_codecs) has run. There is no retry
//! and no cancellation: a run ends in exactly one terminal stage, and a
//! failed run never yields bytes.

use crate::codec::{self, OutputFormat};
use crate::error::ConversionError;
use crate::upload::{self, SourceImageBytes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    Decoding,
    Encoding,
    Succeeded,
    Failed,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Succeeded | Stage::Failed)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Idle => write!(f, "idle"),
            Stage::Decoding => write!(f, "decoding"),
            Stage::Encoding => write!(f, "encoding"),
            Stage::Succeeded => write!(f, "succeeded"),
            Stage::Failed => write!(f, "failed"),
        }
    }
}

/// A finished conversion, ready to be handed out as a download.
#[derive(Debug, Clone)]
pub struct Converted {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub file_name: String,
    pub dimensions: (u32, u32),
}

impl Converted {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}

/// Decode `source`, then encode it as `target`.
///
/// `target` is only checked at the encode step, so unreadable input reports a
/// decode error even when the target is also bad.
pub fn convert(source: &SourceImageBytes, target: &str) -> Result<Converted, ConversionError> {
    Conversion::new().run(source, target)
}

/// [`convert`], reporting each stage entered to `on_stage`.
pub fn convert_with_progress(
    source: &SourceImageBytes,
    target: &str,
    mut on_stage: impl FnMut(Stage),
) -> Result<Converted, ConversionError> {
    Conversion::new().run_reporting(source, target, &mut on_stage)
}

/// A conversion whose current [`Stage`] a host can poll.
///
/// Each [`run`](Conversion::run) starts again from [`Stage::Idle`].
#[derive(Debug, Default)]
pub struct Conversion {
    stage: Stage,
}

impl Conversion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn run(
        &mut self,
        source: &SourceImageBytes,
        target: &str,
    ) -> Result<Converted, ConversionError> {
        self.run_reporting(source, target, &mut |_: Stage| {})
    }

    fn run_reporting(
        &mut self,
        source: &SourceImageBytes,
        target: &str,
        on_stage: &mut impl FnMut(Stage),
    ) -> Result<Converted, ConversionError> {
        self.stage = Stage::Idle;
        let result = self.attempt(source, target, on_stage);

        match &result {
            Ok(converted) => {
                self.enter(Stage::Succeeded, on_stage);
                log::info!(
                    "Converted {} to {} ({} bytes)",
                    source.filename().unwrap_or("upload"),
                    converted.file_name,
                    converted.bytes.len()
                );
            }
            Err(e) => {
                self.enter(Stage::Failed, on_stage);
                log::warn!(
                    "Failed to convert {}: {}",
                    source.filename().unwrap_or("upload"),
                    e
                );
            }
        }

        result
    }

    fn attempt(
        &mut self,
        source: &SourceImageBytes,
        target: &str,
        on_stage: &mut impl FnMut(Stage),
    ) -> Result<Converted, ConversionError> {
        self.enter(Stage::Decoding, on_stage);
        let image = codec::decode(source.bytes(), source.filename())?;

        self.enter(Stage::Encoding, on_stage);
        let format = OutputFormat::try_from(target)?;
        let bytes = codec::encode(&image, format)?;

        Ok(Converted {
            bytes,
            format,
            file_name: upload::attachment_name(source.filename(), format),
            dimensions: image.dimensions(),
        })
    }

    fn enter(&mut self, stage: Stage, on_stage: &mut impl FnMut(Stage)) {
        self.stage = stage;
        on_stage(stage);
    }
}
