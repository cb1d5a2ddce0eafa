//! Decode → normalize → encode

mod decode;
mod encode;
#[cfg(feature = "heif")]
pub(crate) mod heif;
mod normalize;

pub use decode::decode;
pub use encode::{encode, encode_as};

use image::{DynamicImage, GenericImageView};
use serde::{Deserialize, Serialize};
use strum::{EnumCount, EnumIter};

use std::str::FromStr;

use crate::error::EncodeError;
use crate::probe::{ColorHint, SourceFormat};

/// Per-pixel channel layout of a decoded image.
///
/// Describes the source as stored, which can differ from the expanded pixel
/// buffer: palette and CMYK inputs arrive as RGB(A) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Grayscale,
    Rgb,
    Rgba,
    Palette { alpha: bool },
    Cmyk,
    /// gray+alpha, or anything else without a closer match
    Other,
}

impl ColorMode {
    pub(crate) fn classify(pixels: &DynamicImage, hint: Option<ColorHint>) -> Self {
        match hint {
            Some(ColorHint::Palette) => {
                return ColorMode::Palette {
                    alpha: pixels.color().has_alpha(),
                }
            }
            Some(ColorHint::Cmyk) => return ColorMode::Cmyk,
            None => {}
        }

        match pixels {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => ColorMode::Grayscale,
            DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgb16(_)
            | DynamicImage::ImageRgb32F(_) => ColorMode::Rgb,
            DynamicImage::ImageRgba8(_)
            | DynamicImage::ImageRgba16(_)
            | DynamicImage::ImageRgba32F(_) => ColorMode::Rgba,
            _ => ColorMode::Other,
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorMode::Grayscale => f.write_str("grayscale"),
            ColorMode::Rgb => f.write_str("RGB"),
            ColorMode::Rgba => f.write_str("RGBA"),
            ColorMode::Palette { alpha: false } => f.write_str("palette"),
            ColorMode::Palette { alpha: true } => f.write_str("palette+alpha"),
            ColorMode::Cmyk => f.write_str("CMYK"),
            ColorMode::Other => f.write_str("other"),
        }
    }
}

/// An image held in memory for the duration of one conversion.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    source_format: Option<SourceFormat>,
    color_mode: ColorMode,
    pixels: DynamicImage,
}

impl DecodedImage {
    pub(crate) fn new(
        source_format: SourceFormat,
        color_mode: ColorMode,
        pixels: DynamicImage,
    ) -> Self {
        Self {
            source_format: Some(source_format),
            color_mode,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// Container the pixels were decoded from; None for images built in memory.
    pub fn source_format(&self) -> Option<SourceFormat> {
        self.source_format
    }

    /// Whether the expanded pixel buffer carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.pixels.color().has_alpha()
    }

    pub fn pixels(&self) -> &DynamicImage {
        &self.pixels
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(pixels: DynamicImage) -> Self {
        let color_mode = ColorMode::classify(&pixels, None);
        Self {
            source_format: None,
            color_mode,
            pixels,
        }
    }
}

/// Target containers. The set is closed: anything else is rejected at encode time.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumCount, EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
    Bmp,
    Tiff,
    Gif,
}

impl OutputFormat {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    /// Canonical lowercase name, also used as the file extension.
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Tiff => "tiff",
            OutputFormat::Gif => "gif",
        }
    }

    pub fn extension(self) -> &'static str {
        self.as_str()
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Bmp => "image/bmp",
            OutputFormat::Tiff => "image/tiff",
            OutputFormat::Gif => "image/gif",
        }
    }

    /// JPEG and BMP are written without an alpha channel.
    pub fn supports_alpha(self) -> bool {
        match self {
            OutputFormat::Jpeg | OutputFormat::Bmp => false,
            OutputFormat::Png | OutputFormat::Tiff | OutputFormat::Gif => true,
        }
    }

    pub(crate) fn image_format(self) -> image::ImageFormat {
        match self {
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Png => image::ImageFormat::Png,
            OutputFormat::Bmp => image::ImageFormat::Bmp,
            OutputFormat::Tiff => image::ImageFormat::Tiff,
            OutputFormat::Gif => image::ImageFormat::Gif,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OutputFormat {
    type Error = EncodeError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.trim().to_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "bmp" => Ok(OutputFormat::Bmp),
            "tiff" => Ok(OutputFormat::Tiff),
            "gif" => Ok(OutputFormat::Gif),
            _ => Err(EncodeError::UnsupportedTarget(s.to_string())),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, RgbImage, RgbaImage};

    #[test]
    fn output_format_names_are_case_insensitive() {
        assert_eq!("JPEG".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("jpg".parse::<OutputFormat>().unwrap(), OutputFormat::Jpeg);
        assert_eq!("Png".parse::<OutputFormat>().unwrap(), OutputFormat::Png);
        assert_eq!(" tiff ".parse::<OutputFormat>().unwrap(), OutputFormat::Tiff);

        for name in ["webp", "tif", "heic", ""] {
            assert!(matches!(
                name.parse::<OutputFormat>(),
                Err(EncodeError::UnsupportedTarget(_))
            ));
        }
    }

    #[test]
    fn capability_flags() {
        let with_alpha: Vec<_> = OutputFormat::iter().filter(|f| f.supports_alpha()).collect();
        assert_eq!(
            with_alpha,
            vec![OutputFormat::Png, OutputFormat::Tiff, OutputFormat::Gif]
        );
        assert_eq!(OutputFormat::COUNT, 5);
    }

    #[test]
    fn mime_type_follows_format_name() {
        for format in OutputFormat::iter() {
            assert_eq!(format.mime_type(), format!("image/{format}"));
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&OutputFormat::Tiff).unwrap();
        assert_eq!(json, "\"tiff\"");
        let parsed: OutputFormat = serde_json::from_str("\"jpg\"").unwrap();
        assert_eq!(parsed, OutputFormat::Jpeg);
    }

    #[test]
    fn classify_uses_hint_before_layout() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(2, 2));
        let rgb = DynamicImage::ImageRgb8(RgbImage::new(2, 2));
        let gray_alpha = DynamicImage::ImageLumaA8(GrayAlphaImage::new(2, 2));

        assert_eq!(ColorMode::classify(&rgba, None), ColorMode::Rgba);
        assert_eq!(ColorMode::classify(&rgb, None), ColorMode::Rgb);
        assert_eq!(ColorMode::classify(&gray_alpha, None), ColorMode::Other);
        assert_eq!(
            ColorMode::classify(&rgba, Some(ColorHint::Palette)),
            ColorMode::Palette { alpha: true }
        );
        assert_eq!(
            ColorMode::classify(&rgb, Some(ColorHint::Cmyk)),
            ColorMode::Cmyk
        );
    }
}
