//! `pagegrab save <url>`: save every image a page references.

use anyhow::Result;
use pagegrab_core::harvest::{save_page_images, HarvestOptions, HarvestSummary};
use std::io::Write;

use crate::cli::progress::ProgressBar;
use crate::cli::session::Session;

const BAR_WIDTH: usize = 40;

pub fn run_save(
    session: &mut Session,
    url: &str,
    within: Option<(String, String)>,
    limit: Option<usize>,
    show_progress: bool,
) -> Result<HarvestSummary> {
    let options = HarvestOptions {
        scope: within,
        limit,
    };
    let persister = session.persister();
    let scribe = session.scribe();
    let mut bar = ProgressBar::new(BAR_WIDTH, true);
    let summary = save_page_images(
        &mut session.scheduler,
        &persister,
        url,
        &options,
        scribe,
        |done, total| {
            if show_progress {
                let mut out = std::io::stdout().lock();
                let _ = write!(out, "\r{} {}/{}", bar.render(done, total), done, total);
                if done == total {
                    let _ = writeln!(out);
                }
                let _ = out.flush();
            }
        },
    )?;
    println!(
        "Saved {} of {} image(s) to {}",
        summary.saved.len(),
        summary.found,
        session.config.output_dir.display()
    );
    Ok(summary)
}
