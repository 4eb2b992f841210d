//! DownloadSink trait definition.
//!
//! Where downloaded export files end up. The coordinator hands over the
//! bytes and keeps nothing once `save` returns.

use std::path::PathBuf;

use coursewright_types::error::DownloadError;

/// Destination for binary exports (a directory, a test buffer).
pub trait DownloadSink: Send + Sync {
    /// Persist `bytes` under `filename`, returning where they were written.
    fn save(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> impl std::future::Future<Output = Result<PathBuf, DownloadError>> + Send;
}
