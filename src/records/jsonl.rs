use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{ArtRecord, PersistenceError, RecordStore};
use crate::report::AuthenticityReport;

/// Append-only JSON-lines file, one [`ArtRecord`] per line.
#[derive(Debug)]
pub struct JsonlRecordStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Reads every record back; a missing file is an empty store.
    pub async fn load_all(&self) -> Result<Vec<ArtRecord>, PersistenceError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(PersistenceError::from))
            .collect()
    }

    async fn append(&self, record: &ArtRecord) -> Result<(), PersistenceError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        file.write_all(&line).await.map_err(|e| self.io_error(e))?;
        file.flush().await.map_err(|e| self.io_error(e))
    }
}

#[async_trait]
impl RecordStore for JsonlRecordStore {
    async fn save(
        &self,
        content_id: &str,
        uploader: Option<&str>,
        report: &AuthenticityReport,
    ) -> Result<Uuid, PersistenceError> {
        let record = ArtRecord::new(content_id, uploader, report)?;
        self.append(&record).await?;
        debug!(record_id = %record.id, content_id, path = %self.path.display(), "Record appended");
        Ok(record.id)
    }

    fn name(&self) -> &str {
        "jsonl"
    }
}
