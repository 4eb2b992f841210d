//! Client configuration types for coursewright.
//!
//! `ClientConfig` represents the `config.toml` that points the client at a
//! conversation service and controls where downloads land and how logging
//! is set up.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Placeholder substituted with the session id in path templates.
pub const SESSION_ID_PLACEHOLDER: &str = "{session_id}";
/// Placeholder substituted with the export format in path templates.
pub const FORMAT_PLACEHOLDER: &str = "{format}";

/// Top-level configuration for the coursewright client.
///
/// Loaded from `config.toml` in the data directory. All fields have defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the conversation service, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path template for exports and summaries.
    #[serde(default = "default_export_path")]
    pub export_path: String,

    /// Directory downloaded export files are written to.
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Capacity of the session event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    #[serde(default)]
    pub logging: LogSettings,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_export_path() -> String {
    format!("/api/conversations/{SESSION_ID_PLACEHOLDER}/export/{FORMAT_PLACEHOLDER}")
}

fn default_download_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_event_capacity() -> usize {
    256
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            export_path: default_export_path(),
            download_dir: default_download_dir(),
            event_capacity: default_event_capacity(),
            logging: LogSettings::default(),
        }
    }
}

/// Logging setup for the binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text.
    #[serde(default)]
    pub json: bool,

    /// Bridge spans to OpenTelemetry (stdout exporter).
    #[serde(default)]
    pub otel: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            otel: false,
        }
    }
}
