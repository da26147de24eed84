//! Asset naming.
//!
//! Derives the file stem an image is saved under from its URL (or the
//! response's Content-Disposition), sanitized for Linux filesystems. The
//! persister appends the format token, so any extension is dropped here.

mod content_disposition;
mod path;
mod sanitize;

pub use content_disposition::parse_content_disposition_filename;
pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename_for_linux;

use std::collections::HashSet;

/// Stem used when neither the URL nor the headers yield anything usable.
pub const DEFAULT_STEM: &str = "image";

/// Derives a safe file stem for an image.
///
/// Prefers the filename from `content_disposition`, otherwise the last URL
/// path segment, then strips the extension and sanitizes.
///
/// - `asset_stem("https://example.com/img/cat.gif", None)` → `"cat"`
/// - `asset_stem("https://example.com/", None)` → `"image"`
pub fn asset_stem(url: &str, content_disposition: Option<&str>) -> String {
    let candidate = content_disposition
        .and_then(parse_content_disposition_filename)
        .filter(|s| !s.is_empty())
        .or_else(|| filename_from_url_path(url));

    let Some(raw) = candidate else {
        return DEFAULT_STEM.to_string();
    };

    let stem = match raw.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => raw.as_str(),
    };

    let sanitized = sanitize_filename_for_linux(stem);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_STEM.to_string()
    } else {
        sanitized
    }
}

/// Hands out stems unique within one batch: `cat`, `cat_2`, `cat_3`, ...
#[derive(Debug, Default)]
pub struct StemBook {
    used: HashSet<String>,
}

impl StemBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, stem: &str) -> String {
        if self.used.insert(stem.to_string()) {
            return stem.to_string();
        }
        let mut n = 2u32;
        loop {
            let candidate = format!("{}_{}", stem, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
