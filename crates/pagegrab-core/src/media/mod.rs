//! Image assets: pixel mode detection, decoding and persistence.

mod asset;
mod mode;
mod persist;
mod sniff;

pub use asset::{DecodeError, MediaAsset};
pub use mode::{OutputFormat, PixelMode};
pub use persist::{MediaPersister, PersistError, PersistenceOutcome, JPEG_QUALITY};
pub use sniff::is_svg;
