use std::path::PathBuf;
use std::sync::Arc;

use crate::engine::AuthenticityEngine;
use crate::records::RecordStore;
use crate::signing::ReportSigner;
use crate::store::ContentStore;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AuthenticityEngine>,

    pub signer: Arc<dyn ReportSigner>,

    pub store: Arc<dyn ContentStore>,

    pub records: Arc<dyn RecordStore>,

    pub storage_path: PathBuf,
}

impl AppState {
    pub fn new(
        engine: Arc<AuthenticityEngine>,
        signer: Arc<dyn ReportSigner>,
        store: Arc<dyn ContentStore>,
        records: Arc<dyn RecordStore>,
        storage_path: PathBuf,
    ) -> Self {
        Self {
            engine,
            signer,
            store,
            records,
            storage_path,
        }
    }
}
