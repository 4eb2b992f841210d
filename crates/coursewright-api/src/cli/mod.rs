//! CLI command definitions for the `cwright` binary.
//!
//! Uses clap derive macros for argument parsing. Global flags pick the
//! service, data directory, and output style; subcommands choose between the
//! interactive chat and one-shot exports.

pub mod chat;
pub mod export;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use coursewright_types::config::ClientConfig;
use coursewright_types::export::ExportFormat;

/// Design a course with the conversation service from your terminal.
#[derive(Parser)]
#[command(name = "cwright", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Directory holding config.toml.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Explicit config file; unlike the data dir lookup, errors are fatal.
    #[arg(long, global = true, env = "COURSEWRIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Conversation service base URL (overrides config.toml).
    #[arg(long, global = true, env = "COURSEWRIGHT_BASE_URL")]
    pub base_url: Option<String>,

    /// Where downloaded exports are written (overrides config.toml).
    #[arg(long, global = true)]
    pub download_dir: Option<PathBuf>,

    /// Start with connectivity marked as down.
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, config: &mut ClientConfig) {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(dir) = &self.download_dir {
            config.download_dir = dir.clone();
        }
        if let Some(level) = self.log_level() {
            config.logging.level = level.to_string();
        }
    }

    /// Filter directive implied by `--quiet` / `-v`, if any was given.
    pub fn log_level(&self) -> Option<&'static str> {
        match self.verbose {
            0 if self.quiet => Some("error"),
            0 => None,
            1 => Some("info,coursewright=debug"),
            _ => Some("trace"),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive course-design conversation.
    Chat,

    /// Open a session and export it in the given format.
    Export {
        /// Export format: pdf, csv, or json.
        format: ExportFormat,
    },

    /// Open a session and print its structured summary.
    Summary,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
