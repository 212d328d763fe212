use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{ArtRecord, PersistenceError, RecordStore};
use crate::report::AuthenticityReport;

/// In-process record store.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: RwLock<Vec<ArtRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ArtRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn save(
        &self,
        content_id: &str,
        uploader: Option<&str>,
        report: &AuthenticityReport,
    ) -> Result<Uuid, PersistenceError> {
        let record = ArtRecord::new(content_id, uploader, report)?;
        let id = record.id;
        self.records.write().push(record);
        Ok(id)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
