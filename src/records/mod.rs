//! Best-effort metadata persistence for processed artworks.
//!
//! Callers log [`PersistenceError`]s and carry on; a failed save never fails
//! the request that produced the report.

mod error;
mod jsonl;
mod memory;


pub use error::PersistenceError;
pub use jsonl::JsonlRecordStore;
pub use memory::MemoryRecordStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::AuthenticityReport;

/// One persisted row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtRecord {
    pub id: Uuid,
    pub content_id: String,
    pub uploader: Option<String>,
    /// The signed report as JSON.
    pub report_json: String,
    pub signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ArtRecord {
    pub fn new(
        content_id: &str,
        uploader: Option<&str>,
        report: &AuthenticityReport,
    ) -> Result<Self, PersistenceError> {
        Ok(Self {
            id: Uuid::new_v4(),
            content_id: content_id.to_string(),
            uploader: uploader.map(str::to_string),
            report_json: serde_json::to_string(report)?,
            signature: report.signature().map(str::to_string),
            created_at: Utc::now(),
        })
    }

    pub fn report(&self) -> Result<AuthenticityReport, PersistenceError> {
        Ok(serde_json::from_str(&self.report_json)?)
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persists a snapshot of `report` under `content_id` and returns the record id.
    async fn save(
        &self,
        content_id: &str,
        uploader: Option<&str>,
        report: &AuthenticityReport,
    ) -> Result<Uuid, PersistenceError>;

    fn name(&self) -> &str;
}
