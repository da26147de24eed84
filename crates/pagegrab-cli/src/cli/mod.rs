//! CLI for pagegrab.

mod commands;
mod menu;
mod progress;
mod session;

use anyhow::Result;
use clap::{Parser, Subcommand};
use pagegrab_core::{config, logging};
use std::path::PathBuf;

use commands::{run_attrs, run_fetch, run_images, run_menu, run_save};
use session::{Overrides, Session};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pagegrab")]
#[command(about = "Fetch web pages politely and save the images they reference", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/pagegrab/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory images are saved into.
    #[arg(long, short = 'o', global = true, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Mirror every message (including debug detail) to the console.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Retries after a failed request.
    #[arg(long, global = true, value_name = "N")]
    pub max_retry: Option<u32>,

    /// Minimum seconds between the start of two requests.
    #[arg(long, global = true, value_name = "SECS")]
    pub interval: Option<f64>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a URL and print the body (or write it to a file).
    Fetch {
        url: String,
        /// Write the body here instead of stdout.
        #[arg(long = "out", short = 'O', value_name = "FILE")]
        out: Option<PathBuf>,
    },

    /// Print attribute values of elements on a page.
    Attrs {
        url: String,
        /// Select elements by attribute, e.g. `class=thumb`.
        #[arg(long = "match", value_name = "NAME=VALUE", value_parser = parse_attr_pair)]
        matching: (String, String),
        /// Attribute to print.
        #[arg(long, value_name = "NAME")]
        get: String,
        /// Read the attribute from the N-th descendant that has it (1-based).
        #[arg(long, value_name = "N")]
        child: Option<usize>,
        /// Stop after N matching elements.
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// List the image URLs a page references.
    Images {
        url: String,
        /// Only images inside elements with this attribute, e.g. `id=content`.
        #[arg(long, value_name = "NAME=VALUE", value_parser = parse_attr_pair)]
        within: Option<(String, String)>,
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
    },

    /// Save the images a page references.
    Save {
        url: String,
        #[arg(long, value_name = "NAME=VALUE", value_parser = parse_attr_pair)]
        within: Option<(String, String)>,
        #[arg(long, value_name = "N")]
        limit: Option<usize>,
        /// Don't draw the progress bar.
        #[arg(long)]
        no_progress: bool,
    },

    /// Interactive text menu.
    Menu,
}

/// Parses `name=value` (value may be empty).
pub(crate) fn parse_attr_pair(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{s}'")),
    }
}

impl Cli {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = match &cli.config {
            Some(path) => config::load_or_init_at(path)?,
            None => config::load_or_init()?,
        };
        cli.overrides().apply(&mut cfg);

        if let Err(e) = logging::init_logging(cfg.log_dir.as_deref()) {
            eprintln!("pagegrab: file logging unavailable ({e:#}), logging to stderr");
            logging::init_logging_stderr();
        }
        tracing::debug!("loaded config: {:?}", cfg);

        let mut session = Session::new(cfg);
        match cli.command {
            CliCommand::Fetch { url, out } => run_fetch(&mut session, &url, out.as_deref())?,
            CliCommand::Attrs {
                url,
                matching,
                get,
                child,
                limit,
            } => {
                run_attrs(&mut session, &url, &matching, &get, child, limit)?;
            }
            CliCommand::Images { url, within, limit } => {
                run_images(&mut session, &url, within, limit)?;
            }
            CliCommand::Save {
                url,
                within,
                limit,
                no_progress,
            } => {
                run_save(&mut session, &url, within, limit, !no_progress)?;
            }
            CliCommand::Menu => run_menu(&mut session)?,
        }
        Ok(())
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            output_dir: self.output_dir.clone(),
            verbose: self.verbose,
            max_retry: self.max_retry,
            interval: self.interval,
        }
    }
}

#[cfg(test)]
mod tests;
