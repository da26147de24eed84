//! Header sniffing for details the decoder normalizes away (palette PNGs and
//! BMPs, CMYK JPEGs and TIFFs, GIF loop counts, SVG documents).

use super::mode::PixelMode;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// How far into a document we look for the `<svg` root.
const SVG_SCAN_LIMIT: usize = 4096;

/// True if the bytes (or the declared content type) are an SVG document.
pub fn is_svg(bytes: &[u8], content_type: Option<&str>) -> bool {
    if let Some(ct) = content_type {
        let mime = ct.split(';').next().unwrap_or("").trim();
        if mime.eq_ignore_ascii_case("image/svg+xml") {
            return true;
        }
    }
    let head = &bytes[..bytes.len().min(SVG_SCAN_LIMIT)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    if text.starts_with("<svg") {
        return true;
    }
    (text.starts_with("<?xml") || text.starts_with("<!DOCTYPE svg") || text.starts_with("<!--"))
        && text.contains("<svg")
}

/// Pixel mode from the PNG IHDR chunk, `None` if not a well-formed PNG.
///
/// Color type 3 is a palette image; a `tRNS` chunk before `IDAT` gives it
/// alpha. One-bit grayscale is bilevel. Alpha color types are unrecognized.
pub fn png_mode(bytes: &[u8]) -> Option<PixelMode> {
    if bytes.len() < 33 || bytes[..8] != PNG_SIGNATURE || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let bit_depth = bytes[24];
    let color_type = bytes[25];
    let mode = match color_type {
        0 if bit_depth == 1 => PixelMode::Bilevel,
        0 => PixelMode::Grayscale,
        2 => PixelMode::Truecolor,
        3 if png_has_chunk_before_idat(bytes, b"tRNS") => PixelMode::PaletteAlpha,
        3 => PixelMode::Palette,
        _ => PixelMode::Unrecognized,
    };
    Some(mode)
}

fn png_has_chunk_before_idat(bytes: &[u8], wanted: &[u8; 4]) -> bool {
    let mut pos = 8usize;
    while pos + 8 <= bytes.len() {
        let len = u32::from_be_bytes([bytes[pos], bytes[pos + 1], bytes[pos + 2], bytes[pos + 3]]) as usize;
        let kind = &bytes[pos + 4..pos + 8];
        if kind == wanted {
            return true;
        }
        if kind == b"IDAT" || kind == b"IEND" {
            return false;
        }
        pos = match pos.checked_add(12).and_then(|p| p.checked_add(len)) {
            Some(p) => p,
            None => return false,
        };
    }
    false
}

/// Pixel mode from the JPEG frame header component count, `None` if no frame
/// header is found before the scan data.
pub fn jpeg_mode(bytes: &[u8]) -> Option<PixelMode> {
    if bytes.len() < 4 || bytes[0] != 0xff || bytes[1] != 0xd8 {
        return None;
    }
    let mut pos = 2usize;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xff {
            return None;
        }
        let marker = bytes[pos + 1];
        match marker {
            // Fill byte.
            0xff => {
                pos += 1;
                continue;
            }
            // Standalone markers carry no length.
            0x01 | 0xd0..=0xd7 => {
                pos += 2;
                continue;
            }
            // Start of scan: no frame header seen.
            0xda | 0xd9 => return None,
            _ => {}
        }
        let len = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let is_sof = matches!(marker, 0xc0..=0xcf) && !matches!(marker, 0xc4 | 0xc8 | 0xcc);
        if is_sof {
            // length(2) precision(1) height(2) width(2) components(1)
            let components = *bytes.get(pos + 9)?;
            return Some(match components {
                1 => PixelMode::Grayscale,
                4 => PixelMode::SeparatedInk,
                _ => PixelMode::Truecolor,
            });
        }
        pos += 2 + len;
    }
    None
}

/// Pixel mode from a BMP info header: 1 bit per pixel is bilevel, up to 8
/// bits is a palette. `None` for direct color, which the decoded color type
/// describes.
pub fn bmp_mode(bytes: &[u8]) -> Option<PixelMode> {
    if bytes.len() < 30 || &bytes[..2] != b"BM" {
        return None;
    }
    match u16::from_le_bytes([bytes[28], bytes[29]]) {
        1 => Some(PixelMode::Bilevel),
        2..=8 => Some(PixelMode::Palette),
        _ => None,
    }
}

/// TIFF PhotometricInterpretation for separated (CMYK) data.
const TIFF_PHOTOMETRIC_SEPARATED: u16 = 5;
const TIFF_TAG_PHOTOMETRIC: u16 = 262;

/// Ink-separated TIFFs decode to RGB, so the first IFD's photometric tag is
/// the only place the mode survives.
pub fn tiff_mode(bytes: &[u8]) -> Option<PixelMode> {
    let little = match bytes.get(..4)? {
        [b'I', b'I', 42, 0] => true,
        [b'M', b'M', 0, 42] => false,
        _ => return None,
    };
    let u16_at = |pos: usize| -> Option<u16> {
        let b = bytes.get(pos..pos + 2)?;
        Some(if little {
            u16::from_le_bytes([b[0], b[1]])
        } else {
            u16::from_be_bytes([b[0], b[1]])
        })
    };
    let u32_at = |pos: usize| -> Option<u32> {
        let b = bytes.get(pos..pos + 4)?;
        let b = [b[0], b[1], b[2], b[3]];
        Some(if little {
            u32::from_le_bytes(b)
        } else {
            u32::from_be_bytes(b)
        })
    };

    let ifd = u32_at(4)? as usize;
    let entries = u16_at(ifd)? as usize;
    for i in 0..entries {
        let entry = ifd + 2 + i * 12;
        if u16_at(entry)? == TIFF_TAG_PHOTOMETRIC {
            // SHORT value stored inline in the first half of the value field.
            return (u16_at(entry + 8)? == TIFF_PHOTOMETRIC_SEPARATED)
                .then_some(PixelMode::SeparatedInk);
        }
    }
    None
}

/// Loop count from the NETSCAPE2.0 application extension of a GIF: `Some(0)`
/// loops forever, `Some(n)` repeats `n` times, `None` plays once.
pub fn gif_loop_count(bytes: &[u8]) -> Option<u16> {
    const APP_ID: &[u8] = b"NETSCAPE2.0";
    let pos = bytes.windows(APP_ID.len()).position(|w| w == APP_ID)?;
    // Sub-block: size 3, id 1, count (u16 LE).
    let block = bytes.get(pos + APP_ID.len()..pos + APP_ID.len() + 4)?;
    if block[0] != 3 || block[1] != 1 {
        return None;
    }
    Some(u16::from_le_bytes([block[2], block[3]]))
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;

    fn png_header(bit_depth: u8, color_type: u8, extra_chunk: Option<&[u8; 4]>) -> Vec<u8> {
        let mut v = PNG_SIGNATURE.to_vec();
        v.extend_from_slice(&13u32.to_be_bytes());
        v.extend_from_slice(b"IHDR");
        v.extend_from_slice(&1u32.to_be_bytes());
        v.extend_from_slice(&1u32.to_be_bytes());
        v.extend_from_slice(&[bit_depth, color_type, 0, 0, 0]);
        v.extend_from_slice(&[0, 0, 0, 0]); // crc, not checked
        if let Some(kind) = extra_chunk {
            v.extend_from_slice(&0u32.to_be_bytes());
            v.extend_from_slice(kind);
            v.extend_from_slice(&[0, 0, 0, 0]);
        }
        v.extend_from_slice(&0u32.to_be_bytes());
        v.extend_from_slice(b"IDAT");
        v.extend_from_slice(&[0, 0, 0, 0]);
        v
    }

    #[test]
    fn png_modes() {
        assert_eq!(png_mode(&png_header(8, 2, None)), Some(PixelMode::Truecolor));
        assert_eq!(png_mode(&png_header(8, 0, None)), Some(PixelMode::Grayscale));
        assert_eq!(png_mode(&png_header(1, 0, None)), Some(PixelMode::Bilevel));
        assert_eq!(png_mode(&png_header(8, 3, None)), Some(PixelMode::Palette));
        assert_eq!(
            png_mode(&png_header(8, 3, Some(b"PLTE"))),
            Some(PixelMode::Palette)
        );
        assert_eq!(
            png_mode(&png_header(8, 3, Some(b"tRNS"))),
            Some(PixelMode::PaletteAlpha)
        );
        assert_eq!(png_mode(&png_header(8, 6, None)), Some(PixelMode::Unrecognized));
        assert_eq!(png_mode(b"GIF89a"), None);
    }

    fn jpeg_with_components(n: u8) -> Vec<u8> {
        let mut v = vec![0xff, 0xd8];
        // APP0 with a 4-byte payload
        v.extend_from_slice(&[0xff, 0xe0, 0x00, 0x06, b'J', b'F', b'I', b'F']);
        // SOF0: len=8+3n, precision, h, w, n
        let len = 8 + 3 * n as u16;
        v.extend_from_slice(&[0xff, 0xc0]);
        v.extend_from_slice(&len.to_be_bytes());
        v.extend_from_slice(&[8, 0, 1, 0, 1, n]);
        for i in 0..n {
            v.extend_from_slice(&[i + 1, 0x11, 0]);
        }
        v.extend_from_slice(&[0xff, 0xda, 0x00, 0x02]);
        v
    }

    #[test]
    fn jpeg_modes() {
        assert_eq!(jpeg_mode(&jpeg_with_components(3)), Some(PixelMode::Truecolor));
        assert_eq!(jpeg_mode(&jpeg_with_components(1)), Some(PixelMode::Grayscale));
        assert_eq!(
            jpeg_mode(&jpeg_with_components(4)),
            Some(PixelMode::SeparatedInk)
        );
        assert_eq!(jpeg_mode(&[0xff, 0xd8, 0xff, 0xda, 0, 2]), None);
        assert_eq!(jpeg_mode(b"not a jpeg"), None);
    }

    #[test]
    fn svg_detection() {
        assert!(is_svg(b"<svg xmlns='http://www.w3.org/2000/svg'/>", None));
        assert!(is_svg(
            b"\n  <?xml version=\"1.0\"?>\n<svg></svg>",
            None
        ));
        assert!(is_svg(b"whatever", Some("image/svg+xml; charset=utf-8")));
        assert!(!is_svg(b"<?xml version=\"1.0\"?><rss/>", None));
        assert!(!is_svg(b"GIF89a", Some("image/gif")));
    }

    /// Minimal little-endian single-strip 1x1 TIFF.
    pub(crate) fn tiff_1x1(
        photometric: u16,
        bits: u16,
        samples: u16,
        float: bool,
        pixel: &[u8],
    ) -> Vec<u8> {
        let entry_count: u16 = if float { 11 } else { 10 };
        let extra_start = 8 + 2 + 12 * entry_count as usize + 4;
        let mut extra = Vec::new();
        let mut per_sample = |value: u16| -> [u8; 4] {
            let mut field = [0u8; 4];
            if samples <= 2 {
                for i in 0..samples as usize {
                    field[i * 2..i * 2 + 2].copy_from_slice(&value.to_le_bytes());
                }
            } else {
                let offset = (extra_start + extra.len()) as u32;
                for _ in 0..samples {
                    extra.extend_from_slice(&value.to_le_bytes());
                }
                field = offset.to_le_bytes();
            }
            field
        };
        let bits_field = per_sample(bits);
        let format_field = if float { per_sample(3) } else { [0u8; 4] };
        let data_offset = (extra_start + extra.len()) as u32;

        let short = |v: u16| {
            let mut f = [0u8; 4];
            f[..2].copy_from_slice(&v.to_le_bytes());
            f
        };
        let mut entries: Vec<(u16, u16, u32, [u8; 4])> = vec![
            (256, 3, 1, short(1)),
            (257, 3, 1, short(1)),
            (258, 3, samples as u32, bits_field),
            (259, 3, 1, short(1)),
            (262, 3, 1, short(photometric)),
            (273, 4, 1, data_offset.to_le_bytes()),
            (277, 3, 1, short(samples)),
            (278, 3, 1, short(1)),
            (279, 4, 1, (pixel.len() as u32).to_le_bytes()),
            (284, 3, 1, short(1)),
        ];
        if float {
            entries.push((339, 3, samples as u32, format_field));
        }

        let mut v = b"II".to_vec();
        v.extend_from_slice(&42u16.to_le_bytes());
        v.extend_from_slice(&8u32.to_le_bytes());
        v.extend_from_slice(&entry_count.to_le_bytes());
        for (tag, kind, count, field) in entries {
            v.extend_from_slice(&tag.to_le_bytes());
            v.extend_from_slice(&kind.to_le_bytes());
            v.extend_from_slice(&count.to_le_bytes());
            v.extend_from_slice(&field);
        }
        v.extend_from_slice(&0u32.to_le_bytes());
        v.extend_from_slice(&extra);
        v.extend_from_slice(pixel);
        v
    }

    #[test]
    fn tiff_photometric() {
        let cmyk = tiff_1x1(5, 8, 4, false, &[0, 0, 0, 0]);
        assert_eq!(tiff_mode(&cmyk), Some(PixelMode::SeparatedInk));
        let rgb = tiff_1x1(2, 8, 3, false, &[1, 2, 3]);
        assert_eq!(tiff_mode(&rgb), None);
        assert_eq!(tiff_mode(b"II*"), None);
        assert_eq!(tiff_mode(b"GIF89a"), None);
    }

    fn bmp_header(bpp: u16) -> Vec<u8> {
        let mut v = b"BM".to_vec();
        v.extend_from_slice(&[0u8; 26]);
        v.extend_from_slice(&bpp.to_le_bytes());
        v
    }

    #[test]
    fn bmp_bit_depths() {
        assert_eq!(bmp_mode(&bmp_header(1)), Some(PixelMode::Bilevel));
        assert_eq!(bmp_mode(&bmp_header(4)), Some(PixelMode::Palette));
        assert_eq!(bmp_mode(&bmp_header(8)), Some(PixelMode::Palette));
        assert_eq!(bmp_mode(&bmp_header(24)), None);
        assert_eq!(bmp_mode(b"BM"), None);
    }

    #[test]
    fn gif_loop_extension() {
        let with = |count: u16| {
            let mut v = b"GIF89a....!\xff\x0bNETSCAPE2.0".to_vec();
            v.extend_from_slice(&[3, 1]);
            v.extend_from_slice(&count.to_le_bytes());
            v.push(0);
            v
        };
        assert_eq!(gif_loop_count(&with(0)), Some(0));
        assert_eq!(gif_loop_count(&with(3)), Some(3));
        assert_eq!(gif_loop_count(b"GIF89a no extension"), None);
    }
}
