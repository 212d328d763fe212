use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::scoring::{Label, SimilarityEntry};

/// `true` when the report came from fallback mode and is non-authoritative.
pub const META_MOCK: &str = "mock";
/// Name of the encoder that produced the embedding (`"fallback"` in fallback mode).
pub const META_EXTRACTOR: &str = "extractor";
/// Scoring policy that produced `score`.
pub const META_POLICY: &str = "policy";

/// Result of one inference call.
///
/// Fields are private: the assembler builds the report, the signer attaches a
/// signature through [`with_signature`](Self::with_signature), and nothing
/// mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticityReport {
    score: u8,
    label: Option<Label>,
    embedding: Option<Vec<f32>>,
    similar: Vec<SimilarityEntry>,
    signature: Option<String>,
    meta: BTreeMap<String, Value>,
}

impl AuthenticityReport {
    pub(crate) fn new(
        score: u8,
        label: Option<Label>,
        embedding: Option<Vec<f32>>,
        similar: Vec<SimilarityEntry>,
        meta: BTreeMap<String, Value>,
    ) -> Self {
        Self {
            score,
            label,
            embedding,
            similar,
            signature: None,
            meta,
        }
    }

    /// Consumes the unsigned report and returns it with `signature` attached.
    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn label(&self) -> Option<Label> {
        self.label
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    pub fn similar(&self) -> &[SimilarityEntry] {
        &self.similar
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn is_signed(&self) -> bool {
        self.signature.is_some()
    }

    pub fn meta(&self) -> &BTreeMap<String, Value> {
        &self.meta
    }

    /// `meta.mock`, treating an absent key as `false`.
    pub fn is_mock(&self) -> bool {
        self.meta
            .get(META_MOCK)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}
