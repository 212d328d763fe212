//! Filesystem-backed content store for development and tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::ContentStore;
use super::error::UploadError;
use crate::hashing::content_id;

pub const REPORT_FILENAME: &str = "report.json";

/// Writes `<root>/<content_id>/<filename>` and `<root>/<content_id>/report.json`.
///
/// The identifier is derived from the bytes, so identical uploads land in the
/// same directory.
#[derive(Debug, Clone)]
pub struct LocalContentStore {
    root: PathBuf,
}

impl LocalContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Keeps only the final path component; falls back to `upload.bin`.
fn sanitize_filename(filename: &str) -> String {
    Path::new(filename)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty() && name != REPORT_FILENAME)
        .unwrap_or_else(|| "upload.bin".to_string())
}

async fn write(path: PathBuf, bytes: &[u8]) -> Result<(), UploadError> {
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| UploadError::Io { path, source })
}

#[async_trait]
impl ContentStore for LocalContentStore {
    async fn put(
        &self,
        filename: &str,
        primary: Vec<u8>,
        report: Vec<u8>,
    ) -> Result<String, UploadError> {
        let cid = content_id(&primary, &report);
        let dir = self.root.join(&cid);

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| UploadError::Io {
                path: dir.clone(),
                source,
            })?;

        write(dir.join(sanitize_filename(filename)), &primary).await?;
        write(dir.join(REPORT_FILENAME), &report).await?;

        debug!(content_id = %cid, dir = %dir.display(), "Stored artifact locally");
        Ok(cid)
    }

    fn name(&self) -> &str {
        "local"
    }
}
