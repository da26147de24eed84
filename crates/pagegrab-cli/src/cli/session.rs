//! Objects shared by every command: config, scribe, scheduler.

use pagegrab_core::config::PagegrabConfig;
use pagegrab_core::media::MediaPersister;
use pagegrab_core::scheduler::FetchScheduler;
use pagegrab_core::scribe::{ConsoleScribe, Scribe};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line values that replace config file settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub output_dir: Option<PathBuf>,
    /// Only ever turns verbose on.
    pub verbose: bool,
    pub max_retry: Option<u32>,
    pub interval: Option<f64>,
}

impl Overrides {
    pub fn apply(&self, cfg: &mut PagegrabConfig) {
        if let Some(dir) = &self.output_dir {
            cfg.output_dir = dir.clone();
        }
        if self.verbose {
            cfg.verbose = true;
        }
        if let Some(n) = self.max_retry {
            cfg.max_retry = n;
        }
        if let Some(secs) = self.interval {
            cfg.min_request_interval_secs = secs;
        }
    }
}

pub struct Session {
    pub config: PagegrabConfig,
    pub console: ConsoleScribe,
    pub scheduler: FetchScheduler,
    scribe: Arc<dyn Scribe>,
}

impl Session {
    pub fn new(config: PagegrabConfig) -> Self {
        let console = ConsoleScribe::new(config.verbose, config.ui.color);
        let scribe: Arc<dyn Scribe> = Arc::new(console.clone());
        let scheduler = FetchScheduler::with_curl(
            config.request_options(),
            config.retry_policy(),
            config.min_request_interval(),
            scribe.clone(),
        );
        Self {
            config,
            console,
            scheduler,
            scribe,
        }
    }

    pub fn scribe(&self) -> Arc<dyn Scribe> {
        self.scribe.clone()
    }

    /// Persister for the configured output directory (created on demand).
    pub fn persister(&self) -> MediaPersister {
        MediaPersister::with_output_dir(self.config.output_dir.clone(), self.scribe())
    }
}
