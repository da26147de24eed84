//! Pixel modes and output format selection.

use image::ColorType;
use std::fmt;

/// Pixel encoding of a decoded asset. Closed set; anything we can't place is
/// `Unrecognized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelMode {
    Truecolor,
    Grayscale,
    FloatingPoint,
    /// Four-channel ink separation (CMYK).
    SeparatedInk,
    Palette,
    PaletteAlpha,
    /// One bit per pixel.
    Bilevel,
    Vector,
    Unrecognized,
}

impl PixelMode {
    /// Mode implied by a decoded color type. Alpha-carrying direct color has
    /// no home in the closed set.
    pub fn from_color_type(color: ColorType) -> Self {
        match color {
            ColorType::L8 | ColorType::L16 => PixelMode::Grayscale,
            ColorType::Rgb8 | ColorType::Rgb16 => PixelMode::Truecolor,
            ColorType::Rgb32F => PixelMode::FloatingPoint,
            _ => PixelMode::Unrecognized,
        }
    }

    /// Output format for this mode; `None` for `Unrecognized`.
    pub fn output_format(self) -> Option<OutputFormat> {
        match self {
            PixelMode::Truecolor
            | PixelMode::Grayscale
            | PixelMode::FloatingPoint
            | PixelMode::SeparatedInk => Some(OutputFormat::Jpeg),
            PixelMode::Palette | PixelMode::PaletteAlpha | PixelMode::Bilevel => {
                Some(OutputFormat::Gif)
            }
            PixelMode::Vector => Some(OutputFormat::Svg),
            PixelMode::Unrecognized => None,
        }
    }
}

impl fmt::Display for PixelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PixelMode::Truecolor => "truecolor",
            PixelMode::Grayscale => "grayscale",
            PixelMode::FloatingPoint => "floating-point",
            PixelMode::SeparatedInk => "separated-ink",
            PixelMode::Palette => "palette",
            PixelMode::PaletteAlpha => "palette-with-alpha",
            PixelMode::Bilevel => "bilevel",
            PixelMode::Vector => "vector",
            PixelMode::Unrecognized => "unrecognized",
        };
        f.write_str(s)
    }
}

/// File format an asset is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Lossy photographic.
    Jpeg,
    /// Palette, possibly animated.
    Gif,
    /// Vector, written byte-for-byte as fetched.
    Svg,
}

impl OutputFormat {
    /// Uppercase token used as the file extension.
    pub fn token(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Gif => "GIF",
            OutputFormat::Svg => "SVG",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
