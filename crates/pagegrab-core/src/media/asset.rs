//! Decoded image data handed to the persister.

use image::codecs::gif::{GifDecoder, Repeat};
use image::{AnimationDecoder, DynamicImage, Frame, Frames, ImageFormat, ImageResult};
use std::fmt;
use std::io::Cursor;
use thiserror::Error;

use super::mode::PixelMode;
use super::sniff;

/// Fetched bytes could not be turned into an asset.
#[derive(Debug, Error)]
#[error("could not decode image: {0}")]
pub struct DecodeError(#[from] image::ImageError);

/// One image ready to persist: its declared mode, the still (first frame) for
/// raster images, the raw bytes, and an optional frame sequence with its loop
/// setting.
///
/// Frames are consumed by stepping with [`MediaAsset::next_frame`]; an asset
/// is persisted once and then dropped.
pub struct MediaAsset {
    mode: PixelMode,
    raw: Vec<u8>,
    still: Option<DynamicImage>,
    sequence: Option<Frames<'static>>,
    repeat: Option<Repeat>,
    still_taken: bool,
}

impl fmt::Debug for MediaAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaAsset")
            .field("mode", &self.mode)
            .field("raw_len", &self.raw.len())
            .field("has_still", &self.still.is_some())
            .field("has_sequence", &self.sequence.is_some())
            .field("repeat", &self.repeat)
            .finish()
    }
}

impl MediaAsset {
    /// Single raster image with a declared mode.
    pub fn still(mode: PixelMode, image: DynamicImage) -> Self {
        Self {
            mode,
            raw: Vec::new(),
            still: Some(image),
            sequence: None,
            repeat: None,
            still_taken: false,
        }
    }

    /// Raster image whose frames come from `sequence`. `first` is used where a
    /// single still is needed (photographic output). Loops forever unless
    /// changed with [`MediaAsset::with_repeat`].
    pub fn sequence(mode: PixelMode, first: DynamicImage, sequence: Frames<'static>) -> Self {
        Self {
            mode,
            raw: Vec::new(),
            still: Some(first),
            sequence: Some(sequence),
            repeat: Some(Repeat::Infinite),
            still_taken: false,
        }
    }

    /// Loop setting for animated output; `None` plays once.
    pub fn with_repeat(mut self, repeat: Option<Repeat>) -> Self {
        self.repeat = repeat;
        self
    }

    /// Convenience for an in-memory frame list.
    pub fn from_frames(mode: PixelMode, frames: Vec<Frame>) -> Self {
        let first = frames
            .first()
            .map(|f| DynamicImage::ImageRgba8(f.buffer().clone()))
            .unwrap_or_else(|| DynamicImage::new_rgba8(1, 1));
        let iter = frames.into_iter().map(Ok::<Frame, image::ImageError>);
        Self::sequence(mode, first, Frames::new(Box::new(iter)))
    }

    /// Vector document, persisted byte-for-byte.
    pub fn vector(raw: Vec<u8>) -> Self {
        Self {
            mode: PixelMode::Vector,
            raw,
            still: None,
            sequence: None,
            repeat: None,
            still_taken: false,
        }
    }

    /// Decode fetched bytes, detecting the pixel mode from the container.
    pub fn decode(bytes: Vec<u8>, content_type: Option<&str>) -> Result<Self, DecodeError> {
        if sniff::is_svg(&bytes, content_type) {
            return Ok(Self::vector(bytes));
        }

        let format = image::guess_format(&bytes)?;
        let still = image::load_from_memory_with_format(&bytes, format)?;
        let mode = match format {
            ImageFormat::Gif => PixelMode::Palette,
            ImageFormat::Png => {
                sniff::png_mode(&bytes).unwrap_or_else(|| PixelMode::from_color_type(still.color()))
            }
            ImageFormat::Jpeg => sniff::jpeg_mode(&bytes)
                .unwrap_or_else(|| PixelMode::from_color_type(still.color())),
            ImageFormat::Bmp => {
                sniff::bmp_mode(&bytes).unwrap_or_else(|| PixelMode::from_color_type(still.color()))
            }
            ImageFormat::Tiff => sniff::tiff_mode(&bytes)
                .unwrap_or_else(|| PixelMode::from_color_type(still.color())),
            _ => PixelMode::from_color_type(still.color()),
        };

        let (sequence, repeat) = if format == ImageFormat::Gif {
            let decoder = GifDecoder::new(Cursor::new(bytes.clone()))?;
            let repeat = sniff::gif_loop_count(&bytes).map(|n| match n {
                0 => Repeat::Infinite,
                n => Repeat::Finite(n),
            });
            (Some(decoder.into_frames()), repeat)
        } else {
            (None, None)
        };

        Ok(Self {
            mode,
            raw: bytes,
            still: Some(still),
            sequence,
            repeat,
            still_taken: false,
        })
    }

    pub fn mode(&self) -> PixelMode {
        self.mode
    }

    /// Source bytes as fetched (empty for assets built from pixels).
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn repeat(&self) -> Option<Repeat> {
        self.repeat
    }

    pub fn first_frame(&self) -> Option<&DynamicImage> {
        self.still.as_ref()
    }

    /// Step to the next frame. `None` marks the end of the sequence. Assets
    /// without a sequence yield their still exactly once.
    pub fn next_frame(&mut self) -> Option<ImageResult<Frame>> {
        if let Some(seq) = self.sequence.as_mut() {
            return seq.next();
        }
        if self.still_taken {
            return None;
        }
        self.still_taken = true;
        self.still
            .as_ref()
            .map(|img| Ok(Frame::new(img.to_rgba8())))
    }
}
