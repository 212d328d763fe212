//! Content-addressed storage for the uploaded image and its signed report.

mod error;
pub mod local;
pub mod web3;

#[cfg(test)]
mod tests;

pub use error::UploadError;
pub use local::LocalContentStore;
pub use web3::{DEFAULT_UPLOAD_URL, Web3StorageStore};

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

#[async_trait]
/// Stores an artifact together with its report and returns a content identifier.
pub trait ContentStore: Send + Sync {
    /// Uploads `primary` as `filename` alongside `report` (`report.json`).
    async fn put(
        &self,
        filename: &str,
        primary: Vec<u8>,
        report: Vec<u8>,
    ) -> Result<String, UploadError>;

    fn name(&self) -> &str;
}

/// `true` for tokens that are missing, blank, or a `your_…` placeholder.
pub fn is_placeholder_token(token: Option<&str>) -> bool {
    match token.map(str::trim) {
        None | Some("") => true,
        Some(token) => token.to_ascii_lowercase().starts_with("your_"),
    }
}

/// Remote store when a real token is configured, local store under `local_root` otherwise.
pub fn store_from_config(
    token: Option<&str>,
    upload_url: &str,
    local_root: &Path,
) -> Arc<dyn ContentStore> {
    match token {
        Some(token) if !is_placeholder_token(Some(token)) => {
            info!(url = upload_url, "Using web3.storage content store");
            Arc::new(Web3StorageStore::new(upload_url, token.trim()))
        }
        _ => {
            info!(root = %local_root.display(), "No upload token configured, using local content store");
            Arc::new(LocalContentStore::new(local_root))
        }
    }
}
