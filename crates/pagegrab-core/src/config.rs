use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::scribe::Color;
use crate::transport::RequestOptions;

/// Default user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0";

/// Text menu appearance (optional `[ui]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Print the banner art above every menu page.
    pub banner: bool,
    /// Color used for plain console messages.
    pub color: Color,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            banner: true,
            color: Color::Green,
        }
    }
}

/// Global configuration loaded from `~/.config/pagegrab/config.toml`.
///
/// Every field has a default, so partial files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagegrabConfig {
    /// Minimum delay in seconds between the start of two requests.
    pub min_request_interval_secs: f64,
    /// Retries after the first failed attempt (0 = a single attempt).
    pub max_retry: u32,
    /// Additional delay in seconds before a retry. Unset = retry as soon as the
    /// request interval allows.
    pub delay_on_retry_secs: Option<f64>,
    /// Maximum time in seconds to wait for a response.
    pub response_timeout_secs: u64,
    /// Follow HTTP redirects.
    pub follow_redirects: bool,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Directory images are saved into.
    pub output_dir: PathBuf,
    /// Mirror every message to console and log.
    pub verbose: bool,
    /// Log directory override; defaults to the XDG state dir.
    pub log_dir: Option<PathBuf>,
    pub ui: UiConfig,
}

impl Default for PagegrabConfig {
    fn default() -> Self {
        Self {
            min_request_interval_secs: 1.0,
            max_retry: 3,
            delay_on_retry_secs: Some(5.0),
            response_timeout_secs: 30,
            follow_redirects: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            output_dir: PathBuf::from("images"),
            verbose: false,
            log_dir: None,
            ui: UiConfig::default(),
        }
    }
}

/// Seconds to `Duration`; negative or non-finite values count as zero.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

impl PagegrabConfig {
    pub fn min_request_interval(&self) -> Duration {
        secs(self.min_request_interval_secs)
    }

    pub fn delay_on_retry(&self) -> Option<Duration> {
        self.delay_on_retry_secs.map(secs)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retry: self.max_retry,
            delay_on_retry: self.delay_on_retry(),
        }
    }

    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            user_agent: self.user_agent.clone(),
            extra_headers: Vec::new(),
            timeout: self.response_timeout(),
            follow_redirects: self.follow_redirects,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pagegrab")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PagegrabConfig> {
    let path = config_path()?;
    load_or_init_at(&path)
}

/// Same as [`load_or_init`] for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<PagegrabConfig> {
    if !path.exists() {
        let default_cfg = PagegrabConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)
            .with_context(|| format!("failed to write default config to {}", path.display()))?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let cfg: PagegrabConfig =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
