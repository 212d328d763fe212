use crate::constants::{
    DEFAULT_AUTHENTICITY_THRESHOLD, DEFAULT_EMBEDDING_PREVIEW_LEN, DEFAULT_FALLBACK_SCORE_MAX,
    DEFAULT_FALLBACK_SCORE_MIN, DEFAULT_TOP_K,
};

use super::error::ScoringError;

#[derive(Debug, Clone, PartialEq)]
/// Tunables for [`SimilarityScorer`](super::SimilarityScorer) and report assembly.
pub struct ScoringConfig {
    /// Max similarity must be strictly greater than this to label `authentic`.
    pub threshold: f32,
    /// Number of ranked matches kept.
    pub top_k: usize,
    /// Embedding components copied into a report.
    pub embedding_preview_len: usize,
    /// Inclusive lower bound of the fallback-mode score.
    pub fallback_score_min: u8,
    /// Exclusive upper bound of the fallback-mode score.
    pub fallback_score_max: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_AUTHENTICITY_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            embedding_preview_len: DEFAULT_EMBEDDING_PREVIEW_LEN,
            fallback_score_min: DEFAULT_FALLBACK_SCORE_MIN,
            fallback_score_max: DEFAULT_FALLBACK_SCORE_MAX,
        }
    }
}

impl ScoringConfig {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn validate(&self) -> Result<(), ScoringError> {
        if !(-1.0..=1.0).contains(&self.threshold) {
            return Err(ScoringError::InvalidConfig {
                reason: format!(
                    "threshold must be between -1.0 and 1.0, got {}",
                    self.threshold
                ),
            });
        }

        if self.top_k == 0 {
            return Err(ScoringError::InvalidConfig {
                reason: "top_k must be at least 1".to_string(),
            });
        }

        if self.embedding_preview_len == 0 {
            return Err(ScoringError::InvalidConfig {
                reason: "embedding_preview_len must be at least 1".to_string(),
            });
        }

        if self.fallback_score_min >= self.fallback_score_max || self.fallback_score_max > 100 {
            return Err(ScoringError::InvalidConfig {
                reason: format!(
                    "fallback score range [{}, {}) must be non-empty and within 0..=100",
                    self.fallback_score_min, self.fallback_score_max
                ),
            });
        }

        Ok(())
    }
}
