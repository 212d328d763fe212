//! Similarity scoring against the reference set.
//!
//! Given a query embedding and the [`ReferenceSet`](crate::reference::ReferenceSet),
//! [`SimilarityScorer`] computes cosine similarity to every reference, derives a
//! 0..=100 score and a label via a strict threshold, and ranks the top-K matches.
//!
//! Two scoring policies exist: reference-based (max similarity as a percentage)
//! and a norm heuristic used when the set is empty. Fallback mode bypasses both
//! with [`SimilarityScorer::fallback_score`].

pub mod config;
pub mod error;
pub mod scorer;
pub mod types;


pub use config::ScoringConfig;
pub use error::ScoringError;
pub use scorer::{SimilarityScorer, cosine_similarity};
pub use types::{Label, ScoreOutcome, ScorePolicy, SimilarityEntry};
