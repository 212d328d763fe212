//! Report signing.
//!
//! [`ReportSigner`] is the seam; [`Blake3Signer`] is a keyed BLAKE3 MAC over
//! [`canonical_bytes`]. Without a key the service uses [`UnconfiguredSigner`],
//! which fails every request with [`SigningError::SigningUnconfigured`].

mod canonical;
mod error;


pub use canonical::canonical_bytes;
pub use error::SigningError;

use std::sync::Arc;

use tracing::warn;

use crate::report::AuthenticityReport;

pub trait ReportSigner: Send + Sync {
    /// Signs canonical report bytes. Must be deterministic for identical input.
    fn sign(&self, canonical: &[u8]) -> Result<String, SigningError>;

    fn name(&self) -> &str;
}

/// Keyed BLAKE3 MAC; signatures are 64 lowercase hex characters.
#[derive(Clone)]
pub struct Blake3Signer {
    key: [u8; blake3::KEY_LEN],
}

impl std::fmt::Debug for Blake3Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blake3Signer")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Blake3Signer {
    pub fn new(key: [u8; blake3::KEY_LEN]) -> Self {
        Self { key }
    }

    /// Parses a 64-character hex key, with or without a `0x` prefix.
    pub fn from_hex(key: &str) -> Result<Self, SigningError> {
        let trimmed = key.trim();
        let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let parsed = blake3::Hash::from_hex(hex).map_err(|e| SigningError::InvalidKey {
            reason: format!("expected {} hex characters: {e}", blake3::KEY_LEN * 2),
        })?;
        Ok(Self::new(*parsed.as_bytes()))
    }

    /// Constant-time check of `signature` against `canonical`.
    pub fn verify(&self, canonical: &[u8], signature: &str) -> bool {
        match blake3::Hash::from_hex(signature) {
            Ok(expected) => blake3::keyed_hash(&self.key, canonical) == expected,
            Err(_) => false,
        }
    }
}

impl ReportSigner for Blake3Signer {
    fn sign(&self, canonical: &[u8]) -> Result<String, SigningError> {
        Ok(blake3::keyed_hash(&self.key, canonical).to_hex().to_string())
    }

    fn name(&self) -> &str {
        "blake3-keyed"
    }
}

/// Stand-in used when no key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredSigner;

impl ReportSigner for UnconfiguredSigner {
    fn sign(&self, _canonical: &[u8]) -> Result<String, SigningError> {
        Err(SigningError::SigningUnconfigured)
    }

    fn name(&self) -> &str {
        "unconfigured"
    }
}

/// Builds the signer for an optional hex key.
pub fn signer_from_key(key: Option<&str>) -> Result<Arc<dyn ReportSigner>, SigningError> {
    match key {
        Some(key) => Ok(Arc::new(Blake3Signer::from_hex(key)?)),
        None => {
            warn!("No signing key configured; /infer requests will fail until ARTIFY_SIGNER_KEY is set");
            Ok(Arc::new(UnconfiguredSigner))
        }
    }
}

/// Canonicalizes and signs `report`, returning it with the signature attached.
pub fn sign_report(
    signer: &dyn ReportSigner,
    report: AuthenticityReport,
) -> Result<AuthenticityReport, SigningError> {
    let canonical = canonical_bytes(&report)?;
    let signature = signer.sign(&canonical)?;
    Ok(report.with_signature(signature))
}
