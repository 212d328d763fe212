use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    /// Query and reference embeddings disagree on dimension. Indicates a bug upstream.
    #[error("embedding dimension mismatch: query has {query}, reference '{reference}' has {actual}")]
    DimensionMismatch {
        query: usize,
        reference: String,
        actual: usize,
    },

    #[error("vector dimension mismatch: {left} vs {right}")]
    VectorLengthMismatch { left: usize, right: usize },

    #[error("invalid scoring configuration: {reason}")]
    InvalidConfig { reason: String },
}
