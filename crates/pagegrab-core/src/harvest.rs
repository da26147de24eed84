//! Save every image referenced by a page.
//!
//! The page is fetched, its `<img>` sources resolved, and each image fetched
//! through the same scheduler, decoded and handed to the persister. A failing
//! page fetch aborts the batch; a failing image is reported and skipped.

use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

use crate::extract::{Page, PageError};
use crate::media::{MediaAsset, MediaPersister, PersistenceOutcome};
use crate::scheduler::FetchScheduler;
use crate::scribe::{Scribe, Severity, Visibility};
use crate::transport::Transport;
use crate::url_model::{asset_stem, StemBook};

/// Which images to take from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestOptions {
    /// Only images inside elements with this `(attribute, value)`.
    pub scope: Option<(String, String)>,
    /// Stop after this many image sources.
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarvestSummary {
    /// Image sources found on the page (after scope and limit).
    pub found: usize,
    pub saved: Vec<PathBuf>,
    pub skipped: usize,
    pub failed: usize,
}

pub fn save_page_images<T: Transport>(
    scheduler: &mut FetchScheduler<T>,
    persister: &MediaPersister,
    page_url: &str,
    options: &HarvestOptions,
    scribe: Arc<dyn Scribe>,
    mut progress: impl FnMut(usize, usize),
) -> Result<HarvestSummary, PageError> {
    let page = Page::fetch(scheduler, page_url, scribe.clone())?;

    let sources = collect_sources(&page, options);

    let total = sources.len();
    let mut summary = HarvestSummary {
        found: total,
        ..HarvestSummary::default()
    };
    if total == 0 {
        scribe.write(
            "Warning: no images found on page",
            Visibility::Both,
            Severity::Warning,
        );
        return Ok(summary);
    }

    let mut names = StemBook::new();
    for (i, src) in sources.iter().enumerate() {
        let outcome = save_one(scheduler, persister, src.as_str(), &mut names, &*scribe);
        match outcome {
            Some(PersistenceOutcome::Saved { path, .. }) => summary.saved.push(path),
            Some(PersistenceOutcome::Skipped(_)) => summary.skipped += 1,
            Some(PersistenceOutcome::Failed(_)) | None => summary.failed += 1,
        }
        progress(i + 1, total);
    }

    scribe.write(
        &format!(
            "Saved {} of {} image(s) ({} failed, {} skipped)",
            summary.saved.len(),
            total,
            summary.failed,
            summary.skipped
        ),
        Visibility::Both,
        Severity::Plain,
    );
    Ok(summary)
}

/// Image URLs on `page` selected by `options`, in document order.
pub fn collect_sources(page: &Page, options: &HarvestOptions) -> Vec<Url> {
    let mut sources = match &options.scope {
        Some((name, value)) => {
            let mut acc: Vec<Url> = Vec::new();
            for el in page.elements_with_attr(name, value, None) {
                for src in page.image_sources(Some(el)) {
                    if !acc.contains(&src) {
                        acc.push(src);
                    }
                }
            }
            acc
        }
        None => page.image_sources(None),
    };
    if let Some(limit) = options.limit {
        sources.truncate(limit);
    }
    sources
}

/// Fetch, decode and persist one image. `None` when it never reached the
/// persister; the reason has already been reported.
fn save_one<T: Transport>(
    scheduler: &mut FetchScheduler<T>,
    persister: &MediaPersister,
    url: &str,
    names: &mut StemBook,
    scribe: &dyn Scribe,
) -> Option<PersistenceOutcome> {
    let result = match scheduler.fetch(url) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(url, error = %e, "image fetch failed");
            return None;
        }
    };
    if !result.is_success() {
        return None;
    }

    let stem = asset_stem(url, result.headers.content_disposition.as_deref());
    let content_type = result.headers.content_type.clone();
    let asset = match MediaAsset::decode(result.body, content_type.as_deref()) {
        Ok(a) => a,
        Err(e) => {
            scribe.write(
                &format!("Could not decode image {url}: {e}"),
                Visibility::Both,
                Severity::Error,
            );
            return None;
        }
    };
    let name = names.claim(&stem);
    Some(persister.persist(asset, &name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::RetryPolicy;
    use crate::scribe::MemoryScribe;
    use crate::transport::testing::RoutedTransport;
    use crate::transport::RequestOptions;
    use image::codecs::gif::GifEncoder;
    use image::{Delay, DynamicImage, Frame, ImageFormat, Rgba, RgbaImage, RgbImage};
    use std::io::Cursor;
    use std::time::Duration;

    const PAGE: &str = "http://site.test/gallery";

    fn png_rgb() -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, image::Rgb([1, 2, 3])))
            .write_to(&mut out, ImageFormat::Png)
            .unwrap();
        out.into_inner()
    }

    fn gif_animated() -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut enc = GifEncoder::new(&mut out);
            let frames = [10u8, 90, 170].map(|s| {
                Frame::from_parts(
                    RgbaImage::from_pixel(2, 2, Rgba([s, s, s, 255])),
                    0,
                    0,
                    Delay::from_numer_denom_ms(50, 1),
                )
            });
            enc.encode_frames(frames).unwrap();
        }
        out
    }

    fn markup(imgs: &[&str]) -> String {
        let tags: String = imgs
            .iter()
            .map(|s| format!("<div class=\"post\"><img src=\"{s}\"></div>"))
            .collect();
        format!("<html><body>{tags}<aside><img src=\"/ad.png\"></aside></body></html>")
    }

    fn run(
        transport: RoutedTransport,
        options: HarvestOptions,
        out: Option<&std::path::Path>,
    ) -> (Result<HarvestSummary, PageError>, Vec<(usize, usize)>, Arc<MemoryScribe>) {
        let scribe = Arc::new(MemoryScribe::new());
        let mut sched = FetchScheduler::new(
            transport,
            RequestOptions::default(),
            RetryPolicy {
                max_retry: 0,
                delay_on_retry: None,
            },
            Duration::ZERO,
            scribe.clone(),
        );
        let persister = match out {
            Some(dir) => MediaPersister::with_output_dir(dir, scribe.clone()),
            None => MediaPersister::new(scribe.clone()),
        };
        let mut ticks = Vec::new();
        let result = save_page_images(
            &mut sched,
            &persister,
            PAGE,
            &options,
            scribe.clone(),
            |done, total| ticks.push((done, total)),
        );
        (result, ticks, scribe)
    }

    #[test]
    fn saves_each_format_with_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let transport = RoutedTransport::new()
            .route(
                PAGE,
                "text/html",
                markup(&["/a/cat.gif", "/b/cat.png", "logo.svg"]),
            )
            .route("http://site.test/a/cat.gif", "image/gif", gif_animated())
            .route("http://site.test/b/cat.png", "image/png", png_rgb())
            .route(
                "http://site.test/logo.svg",
                "image/svg+xml",
                "<svg xmlns=\"http://www.w3.org/2000/svg\"/>",
            )
            .route("http://site.test/ad.png", "image/png", png_rgb());
        let options = HarvestOptions {
            scope: Some(("class".to_string(), "post".to_string())),
            limit: None,
        };
        let (result, ticks, _) = run(transport, options, Some(dir.path()));
        let summary = result.unwrap();
        assert_eq!(summary.found, 3);
        assert_eq!(summary.failed, 0);
        let names: Vec<String> = summary
            .saved
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["cat.GIF", "cat_2.JPEG", "logo.SVG"]);
        assert_eq!(ticks, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn image_failures_do_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let transport = RoutedTransport::new()
            .route(PAGE, "text/html", markup(&["/missing.png", "/junk.png", "/ok.png"]))
            .route("http://site.test/junk.png", "image/png", "not an image")
            .route("http://site.test/ok.png", "image/png", png_rgb());
        let options = HarvestOptions {
            scope: None,
            limit: Some(3),
        };
        let (result, ticks, scribe) = run(transport, options, Some(dir.path()));
        let summary = result.unwrap();
        assert_eq!(summary.found, 3);
        assert_eq!(summary.saved.len(), 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(ticks.len(), 3);
        assert!(scribe
            .messages(Severity::Error)
            .iter()
            .any(|m| m.contains("Could not decode image http://site.test/junk.png")));
    }

    #[test]
    fn page_failure_aborts() {
        let (result, ticks, _) = run(RoutedTransport::new(), HarvestOptions::default(), None);
        assert!(matches!(result, Err(PageError::Fetch(_))));
        assert!(ticks.is_empty());
    }

    #[test]
    fn without_output_dir_images_are_skipped() {
        let transport = RoutedTransport::new()
            .route(PAGE, "text/html", markup(&["/ok.png"]))
            .route("http://site.test/ok.png", "image/png", png_rgb());
        let options = HarvestOptions {
            scope: Some(("class".to_string(), "post".to_string())),
            limit: None,
        };
        let (result, _, _) = run(transport, options, None);
        let summary = result.unwrap();
        assert_eq!(summary.skipped, 1);
        assert!(summary.saved.is_empty());
    }

    #[test]
    fn empty_page_warns() {
        let transport =
            RoutedTransport::new().route(PAGE, "text/html", "<html><body></body></html>");
        let (result, _, scribe) = run(transport, HarvestOptions::default(), None);
        assert_eq!(result.unwrap().found, 0);
        assert!(!scribe.messages(Severity::Warning).is_empty());
    }
}
