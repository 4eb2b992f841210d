use std::path::PathBuf;

use thiserror::Error;

/// Whether a failure came from the network or from the service itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The request never produced a usable response (connect, DNS,
    /// timeout, unreadable body).
    Network,
    /// The service answered and refused the request.
    Application,
}

/// Failure of a single request to the conversation service.
///
/// Carries enough to decide what to show the user: the service's own
/// message for rejections, a generic connection notice otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request rejected with HTTP {status}: {}", message.as_deref().unwrap_or("no error message"))]
    Rejected { status: u16, message: Option<String> },

    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClientError::Rejected { .. } => FailureKind::Application,
            ClientError::Network(_) | ClientError::Decode(_) => FailureKind::Network,
        }
    }

    pub fn is_network(&self) -> bool {
        self.kind() == FailureKind::Network
    }

    /// The error string the service put in the response body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Errors saving a downloaded export.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("invalid download filename: '{0}'")]
    InvalidFilename(String),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors loading an explicitly requested config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
}
