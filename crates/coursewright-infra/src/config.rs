//! Client configuration loader for coursewright.
//!
//! Reads `config.toml` from the data directory and deserializes it into
//! [`ClientConfig`]. The lenient loader falls back to defaults when the file
//! is missing or malformed; the strict loader is for paths the user named
//! explicitly.

use std::path::{Path, PathBuf};

use coursewright_types::config::ClientConfig;
use coursewright_types::error::ConfigError;

/// Smallest event channel the session manager is given.
const MIN_EVENT_CAPACITY: usize = 16;

/// Resolve the data directory holding `config.toml`.
///
/// Priority:
/// 1. `COURSEWRIGHT_DATA_DIR` environment variable
/// 2. Platform config directory (e.g., `~/.config/coursewright` on Linux)
/// 3. `.coursewright` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("COURSEWRIGHT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(config) = dirs::config_dir() {
        return config.join("coursewright");
    }

    PathBuf::from(".coursewright")
}

/// Load client configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ClientConfig::default()`].
/// - If the file exists but fails to read or parse, logs a warning and returns the default.
/// - Otherwise returns the parsed config.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(
                "No config.toml found at {}, using defaults",
                config_path.display()
            );
            return ClientConfig::default();
        }
        Err(err) => {
            tracing::warn!(
                "Failed to read {}: {err}, using defaults",
                config_path.display()
            );
            return ClientConfig::default();
        }
    };

    match toml::from_str::<ClientConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ClientConfig::default()
        }
    }
}

/// Load client configuration from an explicit file path.
///
/// Unlike [`load_client_config`], any problem is returned to the caller.
pub async fn load_client_config_file(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

/// Event channel capacity with a floor applied.
///
/// A broadcast channel cannot be created with zero capacity.
pub fn resolve_event_capacity(config: &ClientConfig) -> usize {
    config.event_capacity.max(MIN_EVENT_CAPACITY)
}
