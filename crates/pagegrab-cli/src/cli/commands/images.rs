//! `pagegrab images <url>`: list the image URLs a page references.

use anyhow::Result;
use pagegrab_core::extract::Page;
use pagegrab_core::harvest::{collect_sources, HarvestOptions};

use crate::cli::session::Session;

pub fn run_images(
    session: &mut Session,
    url: &str,
    within: Option<(String, String)>,
    limit: Option<usize>,
) -> Result<()> {
    let scribe = session.scribe();
    let page = Page::fetch(&mut session.scheduler, url, scribe)?;
    let options = HarvestOptions {
        scope: within,
        limit,
    };
    for src in collect_sources(&page, &options) {
        println!("{src}");
    }
    Ok(())
}
