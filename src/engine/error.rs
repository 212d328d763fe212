use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl EngineError {
    /// Caller-side input problem (as opposed to an internal failure).
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, EngineError::Embedding(EmbeddingError::InvalidImage { .. }))
    }
}
