use std::collections::BTreeMap;

use serde_json::Value;

use crate::embedding::EmbeddingVector;
use crate::scoring::{Label, ScorePolicy, SimilarityEntry};

use super::types::{AuthenticityReport, META_EXTRACTOR, META_MOCK, META_POLICY};

/// Everything the assembler needs from one pipeline run.
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub score: u8,
    /// `None` when no authoritative label exists (fallback mode).
    pub label: Option<Label>,
    pub embedding: Option<&'a EmbeddingVector>,
    pub ranked: Vec<SimilarityEntry>,
    pub mock: bool,
    /// Encoder name, or `"fallback"`.
    pub extractor: String,
    pub policy: ScorePolicy,
}

/// Packages a pipeline result into an unsigned [`AuthenticityReport`].
///
/// The embedding is truncated to `preview_len` components. `ranked` is kept in
/// the given order. Pure: no I/O.
pub fn assemble(input: ReportInput<'_>, preview_len: usize) -> AuthenticityReport {
    let embedding = input.embedding.map(|e| e.preview(preview_len));

    let mut meta = BTreeMap::new();
    meta.insert(META_MOCK.to_string(), Value::Bool(input.mock));
    meta.insert(META_EXTRACTOR.to_string(), Value::String(input.extractor));
    meta.insert(
        META_POLICY.to_string(),
        Value::String(input.policy.as_str().to_string()),
    );

    AuthenticityReport::new(input.score, input.label, embedding, input.ranked, meta)
}
