//! Artify library crate (used by the server binary and integration tests).
//!
//! # Pipeline
//!
//! Raw image bytes flow through four stages:
//!
//! 1. [`EmbeddingExtractor`] validates and decodes the image, then produces an
//!    [`EmbeddingVector`] with either the CLIP image tower (real mode) or a
//!    random standard-normal vector (fallback mode).
//! 2. [`ReferenceSetLoader`] builds the embeddings of the known-authentic
//!    reference images once per process.
//! 3. [`SimilarityScorer`] compares the query against the references and derives
//!    a 0..=100 score, a label and the top-K matches.
//! 4. [`assemble`] packages the outcome into an unsigned [`AuthenticityReport`].
//!
//! [`AuthenticityEngine`] wires the stages together. Signing, upload and
//! persistence live behind the [`ReportSigner`], [`ContentStore`] and
//! [`RecordStore`] traits; the [`gateway`] module exposes everything over HTTP.
//!
//! ## Test/Mock Support
//! Deterministic encoders are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod embedding;
pub mod engine;
pub mod gateway;
pub mod hashing;
pub mod records;
pub mod reference;
pub mod report;
pub mod scoring;
pub mod signing;
pub mod store;

pub use config::{Config, ConfigError};
#[cfg(any(test, feature = "mock"))]
pub use embedding::{MockImageEncoder, solid_png};
pub use embedding::{
    ClipImageEncoder, EmbeddingError, EmbeddingExtractor, EmbeddingVector, ExtractorConfig,
    ExtractorMode, ImageEncoder,
};
pub use engine::{AuthenticityEngine, EngineError, Prediction};
pub use records::{ArtRecord, JsonlRecordStore, MemoryRecordStore, PersistenceError, RecordStore};
pub use reference::{
    ReferenceEmbedding, ReferenceSet, ReferenceSetLoader, ReferenceSource, build_reference_set,
    sources_from_dir,
};
pub use report::{AuthenticityReport, ReportInput, assemble};
pub use scoring::{
    Label, ScoreOutcome, ScorePolicy, ScoringConfig, ScoringError, SimilarityEntry,
    SimilarityScorer, cosine_similarity,
};
pub use signing::{
    Blake3Signer, ReportSigner, SigningError, UnconfiguredSigner, canonical_bytes, sign_report,
    signer_from_key,
};
pub use store::{
    ContentStore, LocalContentStore, UploadError, Web3StorageStore, is_placeholder_token,
    store_from_config,
};
