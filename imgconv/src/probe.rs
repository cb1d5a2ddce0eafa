//! Container detection from magic bytes
//!
//! Raster decoders expand palettes and convert CMYK on the way in, so the
//! few color facts a caller may still care about are read straight from the
//! container headers here.

use image::ImageFormat;

/// Recognized input containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Jpeg,
    Png,
    Bmp,
    Tiff,
    Gif,
    WebP,
    /// HEIC/HEIF, decoded by the auxiliary codec
    Heif,
}

// ISO-BMFF brands that identify an HEVC-coded still image or sequence
const HEIF_BRANDS: [&[u8; 4]; 10] = [
    b"heic", b"heix", b"hevc", b"hevx", b"heim", b"heis", b"hevm", b"hevs", b"mif1", b"msf1",
];

const AVIF_BRANDS: [&[u8; 4]; 2] = [b"avif", b"avis"];

impl SourceFormat {
    /// Detect the container from its signature. Returns None if unrecognized.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if is_heif(data) {
            return Some(SourceFormat::Heif);
        }

        match image::guess_format(data).ok()? {
            ImageFormat::Jpeg => Some(SourceFormat::Jpeg),
            ImageFormat::Png => Some(SourceFormat::Png),
            ImageFormat::Bmp => Some(SourceFormat::Bmp),
            ImageFormat::Tiff => Some(SourceFormat::Tiff),
            ImageFormat::Gif => Some(SourceFormat::Gif),
            ImageFormat::WebP => Some(SourceFormat::WebP),
            _ => None,
        }
    }

    /// Map a filename extension (case-insensitive, with or without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" | "jfif" => Some(SourceFormat::Jpeg),
            "png" => Some(SourceFormat::Png),
            "bmp" | "dib" => Some(SourceFormat::Bmp),
            "tif" | "tiff" => Some(SourceFormat::Tiff),
            "gif" => Some(SourceFormat::Gif),
            "webp" => Some(SourceFormat::WebP),
            "heic" | "heif" | "hif" => Some(SourceFormat::Heif),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "JPEG",
            SourceFormat::Png => "PNG",
            SourceFormat::Bmp => "BMP",
            SourceFormat::Tiff => "TIFF",
            SourceFormat::Gif => "GIF",
            SourceFormat::WebP => "WebP",
            SourceFormat::Heif => "HEIC/HEIF",
        }
    }

    /// The baseline raster codec for this container, if it has one.
    pub(crate) fn image_format(self) -> Option<ImageFormat> {
        match self {
            SourceFormat::Jpeg => Some(ImageFormat::Jpeg),
            SourceFormat::Png => Some(ImageFormat::Png),
            SourceFormat::Bmp => Some(ImageFormat::Bmp),
            SourceFormat::Tiff => Some(ImageFormat::Tiff),
            SourceFormat::Gif => Some(ImageFormat::Gif),
            SourceFormat::WebP => Some(ImageFormat::WebP),
            SourceFormat::Heif => None,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Color layout facts that decoding erases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorHint {
    Palette,
    Cmyk,
}

/// Read the stored color layout from the container header, when it is one
/// the decoded pixels no longer show.
pub fn color_hint(data: &[u8], format: SourceFormat) -> Option<ColorHint> {
    match format {
        SourceFormat::Png => png_hint(data),
        SourceFormat::Gif => Some(ColorHint::Palette),
        SourceFormat::Bmp => bmp_hint(data),
        SourceFormat::Jpeg => jpeg_hint(data),
        SourceFormat::Tiff => tiff_hint(data),
        SourceFormat::WebP | SourceFormat::Heif => None,
    }
}

// ---------------------------------------------------------------------------
// HEIF: ISO-BMFF `ftyp` box at offset 0
// size(4) "ftyp"(4) major_brand(4) minor_version(4) compatible_brands(4*n)
// ---------------------------------------------------------------------------

fn is_heif(data: &[u8]) -> bool {
    if data.len() < 12 || &data[4..8] != b"ftyp" {
        return false;
    }

    let major = &data[8..12];
    if AVIF_BRANDS.iter().any(|b| b.as_slice() == major) {
        return false;
    }
    if HEIF_BRANDS.iter().any(|b| b.as_slice() == major) {
        return true;
    }

    let box_len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
    let end = box_len.clamp(16, data.len().max(16)).min(data.len());
    if end <= 16 {
        return false;
    }

    let compatible: Vec<&[u8]> = data[16..end].chunks_exact(4).collect();
    if compatible
        .iter()
        .any(|brand| AVIF_BRANDS.iter().any(|b| b.as_slice() == *brand))
    {
        return false;
    }

    compatible
        .iter()
        .any(|brand| HEIF_BRANDS.iter().any(|b| b.as_slice() == *brand))
}

// ---------------------------------------------------------------------------
// PNG: IHDR color type at offset 25 (3 = indexed)
// ---------------------------------------------------------------------------

fn png_hint(data: &[u8]) -> Option<ColorHint> {
    if data.len() < 26 || &data[12..16] != b"IHDR" {
        return None;
    }
    (data[25] == 3).then_some(ColorHint::Palette)
}

// ---------------------------------------------------------------------------
// BMP: 14-byte file header, then DIB header. Bit count sits at offset 24 for
// the 12-byte OS/2 core header and at offset 28 for everything newer.
// ---------------------------------------------------------------------------

fn bmp_hint(data: &[u8]) -> Option<ColorHint> {
    if data.len() < 18 {
        return None;
    }
    let dib_len = u32::from_le_bytes([data[14], data[15], data[16], data[17]]);
    let offset = if dib_len == 12 { 24 } else { 28 };
    let bits = data.get(offset..offset + 2)?;
    let bits = u16::from_le_bytes([bits[0], bits[1]]);

    (bits > 0 && bits <= 8).then_some(ColorHint::Palette)
}

// ---------------------------------------------------------------------------
// JPEG: walk marker segments up to the first SOFn and read its component
// count. Four components means CMYK (or YCCK).
// ---------------------------------------------------------------------------

fn jpeg_hint(data: &[u8]) -> Option<ColorHint> {
    let mut pos = 2;

    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];

        // fill bytes
        if marker == 0xFF {
            pos += 1;
            continue;
        }
        // standalone markers carry no length
        if marker == 0x01 || (0xD0..=0xD9).contains(&marker) {
            pos += 2;
            continue;
        }
        // start of scan: no SOF seen before entropy-coded data
        if marker == 0xDA {
            return None;
        }

        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let is_sof = (0xC0..=0xCF).contains(&marker) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            let components = *data.get(pos + 9)?;
            return (components == 4).then_some(ColorHint::Cmyk);
        }

        pos += 2 + len;
    }

    None
}

// ---------------------------------------------------------------------------
// TIFF: first IFD, PhotometricInterpretation (tag 262).
// 3 = palette, 5 = separated (CMYK).
// ---------------------------------------------------------------------------

fn tiff_hint(data: &[u8]) -> Option<ColorHint> {
    let little = match data.get(0..2)? {
        b"II" => true,
        b"MM" => false,
        _ => return None,
    };
    let u16_at = |at: usize| -> Option<u16> {
        let b = data.get(at..at + 2)?;
        Some(if little {
            u16::from_le_bytes([b[0], b[1]])
        } else {
            u16::from_be_bytes([b[0], b[1]])
        })
    };
    let u32_at = |at: usize| -> Option<u32> {
        let b = data.get(at..at + 4)?;
        Some(if little {
            u32::from_le_bytes([b[0], b[1], b[2], b[3]])
        } else {
            u32::from_be_bytes([b[0], b[1], b[2], b[3]])
        })
    };

    let ifd = u32_at(4)? as usize;
    let entries = u16_at(ifd)? as usize;

    for i in 0..entries {
        let entry = ifd + 2 + i * 12;
        if u16_at(entry)? != 262 {
            continue;
        }
        // SHORT values are left-justified in the 4-byte value field
        return match u16_at(entry + 8)? {
            3 => Some(ColorHint::Palette),
            5 => Some(ColorHint::Cmyk),
            _ => None,
        };
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ftyp(major: &[u8; 4], compatible: &[&[u8; 4]]) -> Vec<u8> {
        let len = 16 + 4 * compatible.len();
        let mut data = Vec::with_capacity(len + 8);
        data.extend_from_slice(&(len as u32).to_be_bytes());
        data.extend_from_slice(b"ftyp");
        data.extend_from_slice(major);
        data.extend_from_slice(&[0, 0, 0, 0]);
        for brand in compatible {
            data.extend_from_slice(*brand);
        }
        data.extend_from_slice(&[0, 0, 0, 8, b'm', b'e', b't', b'a']);
        data
    }

    #[test]
    fn detects_raster_signatures() {
        assert_eq!(
            SourceFormat::detect(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10]),
            Some(SourceFormat::Jpeg)
        );
        assert_eq!(
            SourceFormat::detect(b"\x89PNG\r\n\x1a\n\0\0\0\x0dIHDR"),
            Some(SourceFormat::Png)
        );
        assert_eq!(SourceFormat::detect(b"GIF89a\x01\0\x01\0"), Some(SourceFormat::Gif));
        assert_eq!(SourceFormat::detect(b"BM\0\0\0\0\0\0"), Some(SourceFormat::Bmp));
        assert_eq!(SourceFormat::detect(b"II*\0\x08\0\0\0"), Some(SourceFormat::Tiff));
        assert_eq!(SourceFormat::detect(b"MM\0*\0\0\0\x08"), Some(SourceFormat::Tiff));
    }

    #[test]
    fn rejects_unknown_signatures() {
        assert_eq!(SourceFormat::detect(&[0x00, 0x01, 0x02]), None);
        assert_eq!(SourceFormat::detect(&[]), None);
        assert_eq!(SourceFormat::detect(b"hello, world"), None);
    }

    #[test]
    fn heif_by_major_or_compatible_brand() {
        assert_eq!(SourceFormat::detect(&ftyp(b"heic", &[])), Some(SourceFormat::Heif));
        assert_eq!(
            SourceFormat::detect(&ftyp(b"mif1", &[b"heic"])),
            Some(SourceFormat::Heif)
        );
        assert_eq!(
            SourceFormat::detect(&ftyp(b"isom", &[b"mif1", b"heic"])),
            Some(SourceFormat::Heif)
        );
    }

    #[test]
    fn avif_is_not_heif() {
        assert_ne!(
            SourceFormat::detect(&ftyp(b"avif", &[b"mif1", b"miaf"])),
            Some(SourceFormat::Heif)
        );
        assert_ne!(
            SourceFormat::detect(&ftyp(b"isom", &[b"mif1", b"avif"])),
            Some(SourceFormat::Heif)
        );
    }

    #[test]
    fn extension_hint_is_case_insensitive() {
        assert_eq!(SourceFormat::from_extension("JPG"), Some(SourceFormat::Jpeg));
        assert_eq!(SourceFormat::from_extension(".heic"), Some(SourceFormat::Heif));
        assert_eq!(SourceFormat::from_extension("Tif"), Some(SourceFormat::Tiff));
        assert_eq!(SourceFormat::from_extension("txt"), None);
    }

    #[test]
    fn png_palette_from_ihdr() {
        let mut ihdr = b"\x89PNG\r\n\x1a\n\0\0\0\x0dIHDR".to_vec();
        ihdr.extend_from_slice(&[0, 0, 0, 4, 0, 0, 0, 4, 8, 3, 0, 0, 0]);
        assert_eq!(color_hint(&ihdr, SourceFormat::Png), Some(ColorHint::Palette));

        ihdr[25] = 6;
        assert_eq!(color_hint(&ihdr, SourceFormat::Png), None);
    }

    #[test]
    fn bmp_palette_from_bit_count() {
        let mut bmp = vec![0u8; 54];
        bmp[0..2].copy_from_slice(b"BM");
        bmp[14..18].copy_from_slice(&40u32.to_le_bytes());
        bmp[28..30].copy_from_slice(&8u16.to_le_bytes());
        assert_eq!(color_hint(&bmp, SourceFormat::Bmp), Some(ColorHint::Palette));

        bmp[28..30].copy_from_slice(&24u16.to_le_bytes());
        assert_eq!(color_hint(&bmp, SourceFormat::Bmp), None);
    }

    #[test]
    fn jpeg_cmyk_from_sof_components() {
        let mut jpeg = vec![0xFF, 0xD8];
        // APP0 segment, skipped
        jpeg.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
        // SOF0: len, precision, height, width, components
        jpeg.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x14, 0x08, 0x00, 0x10, 0x00, 0x10, 0x04]);
        assert_eq!(color_hint(&jpeg, SourceFormat::Jpeg), Some(ColorHint::Cmyk));

        let last = jpeg.len() - 1;
        jpeg[last] = 3;
        assert_eq!(color_hint(&jpeg, SourceFormat::Jpeg), None);
    }

    #[test]
    fn tiff_photometric_interpretation() {
        // little-endian header, one IFD entry: 262 SHORT 1 -> 5
        let mut tiff = b"II*\0\x08\0\0\0".to_vec();
        tiff.extend_from_slice(&1u16.to_le_bytes());
        tiff.extend_from_slice(&262u16.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&[5, 0, 0, 0]);
        assert_eq!(color_hint(&tiff, SourceFormat::Tiff), Some(ColorHint::Cmyk));

        tiff[18] = 3;
        assert_eq!(color_hint(&tiff, SourceFormat::Tiff), Some(ColorHint::Palette));

        tiff[18] = 2;
        assert_eq!(color_hint(&tiff, SourceFormat::Tiff), None);
    }
}
