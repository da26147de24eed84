//! Message sink shared by the scheduler, persister and CLI.
//!
//! A scribe decides where a message goes (console, log, both) and how it is
//! colored on the console. Log output is emitted as `tracing` events so it
//! lands in whatever subscriber `logging::init_logging` installed.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Where a message should be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Console,
    Log,
    Both,
    /// Diagnostic detail: console and log in verbose mode, dropped otherwise.
    Debug,
}

/// Message severity; selects the console color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Uses the scribe's accent color.
    Plain,
    Success,
    Warning,
    Error,
}

/// Named console colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Purple,
    Cyan,
    DarkCyan,
    Blue,
    Green,
    Yellow,
    Red,
    #[default]
    Default,
}

impl Color {
    pub fn ansi(self) -> &'static str {
        match self {
            Color::Purple => "\x1b[95m",
            Color::Cyan => "\x1b[96m",
            Color::DarkCyan => "\x1b[36m",
            Color::Blue => "\x1b[94m",
            Color::Green => "\x1b[92m",
            Color::Yellow => "\x1b[93m",
            Color::Red => "\x1b[91m",
            Color::Default => "\x1b[0m",
        }
    }
}

impl Severity {
    pub fn color(self, accent: Color) -> Color {
        match self {
            Severity::Plain => accent,
            Severity::Success => Color::Green,
            Severity::Warning => Color::Yellow,
            Severity::Error => Color::Red,
        }
    }
}

/// Logging collaborator. Callers never inspect a result; writing is best effort.
pub trait Scribe: Send + Sync {
    fn write(&self, message: &str, visibility: Visibility, severity: Severity);
}

/// Resolve `(console, log)` targets for a message.
pub fn targets(visibility: Visibility, verbose: bool) -> (bool, bool) {
    if verbose {
        return (true, true);
    }
    match visibility {
        Visibility::Console => (true, false),
        Visibility::Log => (false, true),
        Visibility::Both => (true, true),
        Visibility::Debug => (false, false),
    }
}

/// Colored stdout + `tracing` scribe used by the CLI.
#[derive(Debug, Clone)]
pub struct ConsoleScribe {
    verbose: bool,
    accent: Color,
}

impl ConsoleScribe {
    pub fn new(verbose: bool, accent: Color) -> Self {
        Self { verbose, accent }
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Render `message` wrapped in its color escape.
    pub fn paint(&self, message: &str, severity: Severity) -> String {
        format!(
            "{}{}{}",
            severity.color(self.accent).ansi(),
            message,
            Color::Default.ansi()
        )
    }
}

impl Scribe for ConsoleScribe {
    fn write(&self, message: &str, visibility: Visibility, severity: Severity) {
        let (console, log) = targets(visibility, self.verbose);
        if console {
            println!("{}", self.paint(message, severity));
        }
        if log {
            match (visibility, severity) {
                (_, Severity::Error) => tracing::error!("{}", message),
                (_, Severity::Warning) => tracing::warn!("{}", message),
                (Visibility::Debug, _) => tracing::debug!("{}", message),
                _ => tracing::info!("{}", message),
            }
        }
    }
}

/// A message captured by [`MemoryScribe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub message: String,
    pub visibility: Visibility,
    pub severity: Severity,
}

/// Scribe that keeps messages in memory; handy for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryScribe {
    entries: Mutex<Vec<Entry>>,
}

impl MemoryScribe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Messages written with the given severity.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|e| e.severity == severity)
            .map(|e| e.message)
            .collect()
    }
}

impl Scribe for MemoryScribe {
    fn write(&self, message: &str, visibility: Visibility, severity: Severity) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(Entry {
                message: message.to_string(),
                visibility,
                severity,
            });
        }
    }
}
