use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    /// Store rejected the upload, was unreachable, or returned no identifier.
    #[error("upload failed: {reason}")]
    UploadFailed { reason: String },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
