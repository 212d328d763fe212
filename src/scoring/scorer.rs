use std::cmp::Ordering;

use rand::Rng;
use tracing::debug;

use crate::embedding::EmbeddingVector;
use crate::reference::ReferenceSet;

use super::config::ScoringConfig;
use super::error::ScoringError;
use super::types::{Label, ScoreOutcome, ScorePolicy, SimilarityEntry};

/// Cosine similarity `dot(a, b) / (‖a‖·‖b‖)`, clamped to `[-1, 1]`.
///
/// A zero-norm operand yields `0.0`. Accumulates in `f64`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, ScoringError> {
    if a.len() != b.len() {
        return Err(ScoringError::VectorLengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if similarity.is_nan() {
        return Ok(0.0);
    }
    Ok(similarity.clamp(-1.0, 1.0) as f32)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Compares query embeddings against a [`ReferenceSet`].
#[derive(Debug, Clone)]
pub struct SimilarityScorer {
    config: ScoringConfig,
}

impl SimilarityScorer {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn threshold(&self) -> f32 {
        self.config.threshold
    }

    /// Scores `query` against `refs`.
    ///
    /// With references: score is `max_sim` as a percentage (negatives clamp to 0),
    /// label is `authentic` iff `max_sim > threshold`. With an empty set the
    /// norm heuristic applies instead.
    pub fn score(
        &self,
        query: &EmbeddingVector,
        refs: &ReferenceSet,
    ) -> Result<ScoreOutcome, ScoringError> {
        if refs.is_empty() {
            debug!("Empty reference set, using norm heuristic");
            return Ok(self.score_without_references(query));
        }

        let similarities = self.similarities(query, refs)?;

        // Strict `>` keeps the first-seen maximum on ties.
        let max_sim = similarities
            .iter()
            .map(|entry| entry.similarity)
            .fold(f32::NEG_INFINITY, |best, sim| if sim > best { sim } else { best });

        let label = Label::from_threshold(max_sim, self.config.threshold);
        let score = (max_sim.clamp(0.0, 1.0) * 100.0).round() as u8;
        let ranked = self.rank(similarities);

        debug!(
            max_similarity = max_sim,
            threshold = self.config.threshold,
            score,
            label = %label,
            references = refs.len(),
            "Scored against reference set"
        );

        Ok(ScoreOutcome {
            score,
            label,
            ranked,
            confidence: max_sim,
            policy: ScorePolicy::Reference,
        })
    }

    /// Similarity to every reference, in reference-set order.
    pub fn similarities(
        &self,
        query: &EmbeddingVector,
        refs: &ReferenceSet,
    ) -> Result<Vec<SimilarityEntry>, ScoringError> {
        refs.iter()
            .map(|reference| {
                let embedding = reference.embedding();
                if embedding.dim() != query.dim() {
                    return Err(ScoringError::DimensionMismatch {
                        query: query.dim(),
                        reference: reference.id().to_string(),
                        actual: embedding.dim(),
                    });
                }
                let similarity = cosine_similarity(query.as_slice(), embedding.as_slice())?;
                Ok(SimilarityEntry::new(reference.id(), similarity))
            })
            .collect()
    }

    /// Stable descending sort by similarity, truncated to `top_k`.
    pub fn rank(&self, mut similarities: Vec<SimilarityEntry>) -> Vec<SimilarityEntry> {
        similarities.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
        });
        similarities.truncate(self.config.top_k);
        similarities
    }

    /// Norm-based heuristic: `p = sigmoid(‖q‖ - 1)`, `score = floor(100·p)`.
    pub fn score_without_references(&self, query: &EmbeddingVector) -> ScoreOutcome {
        let probability = sigmoid(query.norm() - 1.0);
        let score = (100.0 * probability).floor().clamp(0.0, 100.0) as u8;

        ScoreOutcome {
            score,
            label: Label::from_threshold(probability, self.config.threshold),
            ranked: Vec::new(),
            confidence: probability,
            policy: ScorePolicy::NormHeuristic,
        }
    }

    /// Draws a non-authoritative score from `[fallback_score_min, fallback_score_max)`.
    pub fn fallback_score<R: Rng>(&self, rng: &mut R) -> u8 {
        rng.gen_range(self.config.fallback_score_min..self.config.fallback_score_max)
    }
}
