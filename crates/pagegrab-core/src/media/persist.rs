//! Writes decoded assets to the output directory in a format chosen from
//! their pixel mode.

use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Frame, ImageError};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use super::asset::MediaAsset;
use super::mode::{OutputFormat, PixelMode};
use crate::scribe::{Scribe, Severity, Visibility};
use crate::storage;

/// Quality used for photographic output.
pub const JPEG_QUALITY: u8 = 75;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("no output format for pixel mode {0}")]
    FormatUnknown(PixelMode),
    #[error("asset has no frames to write")]
    NoFrames,
    #[error("encode failed: {0}")]
    Encode(#[from] ImageError),
    #[error("write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of one `persist` call.
#[derive(Debug)]
pub enum PersistenceOutcome {
    Saved {
        path: PathBuf,
        format: OutputFormat,
        frames: usize,
    },
    Skipped(String),
    Failed(PersistError),
}

impl PersistenceOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, PersistenceOutcome::Saved { .. })
    }
}

pub struct MediaPersister {
    output_dir: Option<PathBuf>,
    scribe: Arc<dyn Scribe>,
}

impl MediaPersister {
    /// Unconfigured persister; every `persist` is skipped until
    /// [`set_output_dir`](Self::set_output_dir) succeeds.
    pub fn new(scribe: Arc<dyn Scribe>) -> Self {
        Self {
            output_dir: None,
            scribe,
        }
    }

    /// Persister writing into `dir`, created if missing.
    pub fn with_output_dir(dir: impl Into<PathBuf>, scribe: Arc<dyn Scribe>) -> Self {
        let mut persister = Self::new(scribe);
        persister.set_output_dir(dir);
        persister
    }

    /// Create `dir` and make it the output directory. On failure the error is
    /// reported and the persister is left unconfigured.
    pub fn set_output_dir(&mut self, dir: impl Into<PathBuf>) -> bool {
        let dir = dir.into();
        match storage::ensure_dir(&dir) {
            Ok(()) => {
                self.scribe.write(
                    &format!("Output directory set to {}", dir.display()),
                    Visibility::Debug,
                    Severity::Plain,
                );
                self.output_dir = Some(dir);
                true
            }
            Err(e) => {
                self.scribe.write(
                    &format!("Could not create directory {}: {}", dir.display(), e),
                    Visibility::Both,
                    Severity::Error,
                );
                self.output_dir = None;
                false
            }
        }
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    /// Save `asset` as `<output_dir>/<name>.<FORMAT>`.
    pub fn persist(&self, mut asset: MediaAsset, name: &str) -> PersistenceOutcome {
        let Some(dir) = self.output_dir.as_deref() else {
            self.scribe.write(
                &format!("Warning: output directory not set, skipping {name}"),
                Visibility::Both,
                Severity::Warning,
            );
            return PersistenceOutcome::Skipped("output directory not set".to_string());
        };

        let mode = asset.mode();
        let Some(format) = mode.output_format() else {
            self.scribe.write(
                &format!("Could not determine format for {name} (mode {mode})"),
                Visibility::Both,
                Severity::Error,
            );
            return PersistenceOutcome::Failed(PersistError::FormatUnknown(mode));
        };

        let encoded = match format {
            OutputFormat::Jpeg => encode_jpeg(&asset, mode).map(|b| (b, 1)),
            OutputFormat::Gif => {
                let frames = self.probe_frames(&mut asset, name);
                let count = frames.len();
                encode_gif(frames, asset.repeat()).map(|b| (b, count))
            }
            OutputFormat::Svg => Ok((asset.raw().to_vec(), 1)),
        };
        let (bytes, frames) = match encoded {
            Ok(v) => v,
            Err(e) => {
                self.scribe.write(
                    &format!("Could not encode {name}: {e}"),
                    Visibility::Both,
                    Severity::Error,
                );
                return PersistenceOutcome::Failed(e);
            }
        };

        let path = dir.join(format!("{}.{}", name, format.token()));
        if let Err(source) = storage::write_atomic(&path, &bytes) {
            self.scribe.write(
                &format!("Could not save {}: {}", path.display(), source),
                Visibility::Both,
                Severity::Error,
            );
            return PersistenceOutcome::Failed(PersistError::Write { path, source });
        }

        let detail = if frames > 1 {
            format!(" ({frames} frames)")
        } else {
            String::new()
        };
        self.scribe.write(
            &format!("Image saved: {}{}", path.display(), detail),
            Visibility::Both,
            Severity::Success,
        );
        PersistenceOutcome::Saved {
            path,
            format,
            frames,
        }
    }

    /// Step through the asset's frames until exhaustion or a decode error.
    /// Frames read before an error are kept.
    fn probe_frames(&self, asset: &mut MediaAsset, name: &str) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(next) = asset.next_frame() {
            match next {
                Ok(frame) => frames.push(frame),
                Err(e) => {
                    self.scribe.write(
                        &format!(
                            "Frame probe for {name} stopped after {} frame(s): {e}",
                            frames.len()
                        ),
                        Visibility::Log,
                        Severity::Warning,
                    );
                    break;
                }
            }
        }
        if frames.is_empty() {
            if let Some(still) = asset.first_frame() {
                frames.push(Frame::new(still.to_rgba8()));
            }
        }
        frames
    }
}

fn encode_jpeg(asset: &MediaAsset, mode: PixelMode) -> Result<Vec<u8>, PersistError> {
    let still = asset.first_frame().ok_or(PersistError::NoFrames)?;
    // The encoder takes no alpha; grayscale stays single channel.
    let flat = match mode {
        PixelMode::Grayscale => DynamicImage::ImageLuma8(still.to_luma8()),
        _ => DynamicImage::ImageRgb8(still.to_rgb8()),
    };
    let mut buf = Vec::new();
    flat.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY))?;
    Ok(buf)
}

/// Animated output keeps the source's loop setting; `None` writes no loop
/// extension, so viewers play it once.
fn encode_gif(frames: Vec<Frame>, repeat: Option<Repeat>) -> Result<Vec<u8>, PersistError> {
    if frames.is_empty() {
        return Err(PersistError::NoFrames);
    }
    let animated = frames.len() > 1;
    let mut buf = Vec::new();
    {
        // Trailer is written when the encoder drops.
        let mut encoder = GifEncoder::new(&mut buf);
        if animated {
            if let Some(repeat) = repeat {
                encoder.set_repeat(repeat)?;
            }
            encoder.encode_frames(frames)?;
        } else {
            for frame in frames {
                encoder.encode_frame(frame)?;
            }
        }
    }
    Ok(buf)
}
