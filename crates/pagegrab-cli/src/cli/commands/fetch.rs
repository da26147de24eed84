//! `pagegrab fetch <url>`: fetch once (with rate limit and retries) and print the body.

use anyhow::{Context, Result};
use pagegrab_core::scribe::{Severity, Visibility};
use pagegrab_core::storage;
use std::io::Write;
use std::path::Path;

use crate::cli::session::Session;

pub fn run_fetch(session: &mut Session, url: &str, out: Option<&Path>) -> Result<()> {
    let result = session.scheduler.fetch(url)?;
    session.scribe().write(
        &format!(
            "HTTP {} from {}: {:.1} KiB in {:.2} sec, {} attempt(s)",
            result.status,
            url,
            result.size_kb(),
            result.duration.as_secs_f64(),
            result.attempts
        ),
        Visibility::Debug,
        Severity::Plain,
    );

    match out {
        Some(path) => {
            storage::write_atomic(path, &result.body)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {} bytes to {}", result.size_bytes, path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&result.body)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
