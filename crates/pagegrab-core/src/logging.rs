//! Log file setup. Everything the scribe sends to the log, plus the core's own
//! `tracing` events, ends up in `pagegrab.log`.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "pagegrab.log";

/// Filter when `RUST_LOG` is unset and we log to a file.
const FILE_FILTER: &str = "info,pagegrab=debug,pagegrab_core=debug";
/// Filter for the stderr fallback; keep the terminal quiet.
const STDERR_FILTER: &str = "warn";

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// `~/.local/state/pagegrab`, used when the config sets no `log_dir`.
pub fn default_log_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pagegrab")?;
    Ok(xdg_dirs.get_state_home())
}

/// Install the global subscriber appending to `<log_dir>/pagegrab.log`.
/// Returns the log file path. Errors (unwritable directory, subscriber already
/// set) are returned so the caller can fall back to [`init_logging_stderr`].
pub fn init_logging(log_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match log_dir {
        Some(d) => d.to_path_buf(),
        None => default_log_dir()?,
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create log directory {}", dir.display()))?;

    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter_or(FILE_FILTER))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;

    tracing::info!(path = %path.display(), "logging started");
    Ok(path)
}

/// Log warnings and errors to stderr only. Never fails; a subscriber that is
/// already installed is left alone.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_or(STDERR_FILTER))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
