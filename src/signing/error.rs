use thiserror::Error;

#[derive(Debug, Error)]
pub enum SigningError {
    /// No signing key is configured. Unsigned reports carry no integrity guarantee.
    #[error("report signing is not configured (set ARTIFY_SIGNER_KEY)")]
    SigningUnconfigured,

    #[error("invalid signing key: {reason}")]
    InvalidKey { reason: String },

    #[error("failed to canonicalize report: {0}")]
    Canonicalization(#[from] serde_json::Error),
}
