//! Filesystem download sink.
//!
//! Writes exported files into a configured directory. Filenames come from
//! the service, so only their final path component is used.

use std::path::{Path, PathBuf};

use coursewright_core::export::DownloadSink;
use coursewright_types::error::DownloadError;

/// Saves downloads into a single directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct FileDownloadSink {
    dir: PathBuf,
}

impl FileDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadSink for FileDownloadSink {
    async fn save(&self, filename: &str, bytes: Vec<u8>) -> Result<PathBuf, DownloadError> {
        let name = sanitize_filename(filename)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| DownloadError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.dir.join(name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| DownloadError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "download written");
        Ok(path)
    }
}

/// Reduce a suggested filename to its last path component.
fn sanitize_filename(filename: &str) -> Result<&str, DownloadError> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() || name == "." || name == ".." {
        return Err(DownloadError::InvalidFilename(filename.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sanitize_keeps_last_component() {
        assert_eq!(sanitize_filename("report.pdf").unwrap(), "report.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(
            sanitize_filename(r"C:\tmp\design.csv").unwrap(),
            "design.csv"
        );
    }

    #[test]
    fn sanitize_rejects_empty_names() {
        assert!(sanitize_filename("").is_err());
        assert!(sanitize_filename("exports/").is_err());
        assert!(sanitize_filename("..").is_err());
    }

    #[tokio::test]
    async fn save_writes_into_directory() {
        let tmp = TempDir::new().unwrap();
        let sink = FileDownloadSink::new(tmp.path().join("downloads"));

        let path = sink.save("design.pdf", b"%PDF".to_vec()).await.unwrap();

        assert_eq!(path, tmp.path().join("downloads").join("design.pdf"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"%PDF");
    }

    #[tokio::test]
    async fn save_cannot_escape_directory() {
        let tmp = TempDir::new().unwrap();
        let sink = FileDownloadSink::new(tmp.path());

        let path = sink.save("../outside.csv", b"a,b".to_vec()).await.unwrap();
        assert_eq!(path, tmp.path().join("outside.csv"));
    }
}
