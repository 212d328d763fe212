//! Ties the extractor, the reference set and the scorer into one pipeline.
//!
//! [`AuthenticityEngine`] is `Send + Sync` and shared through `Arc`. The extractor
//! mode is fixed at construction; the reference set is built on first use.

mod error;
pub mod global;


pub use error::EngineError;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::config::Config;
use crate::embedding::{EmbeddingExtractor, EmbeddingVector, ExtractorMode};
use crate::reference::{ReferenceSet, ReferenceSetLoader};
use crate::report::{AuthenticityReport, ReportInput, assemble};
use crate::scoring::{Label, ScoreOutcome, ScorePolicy, SimilarityScorer};

/// Label + confidence for the lightweight `/predict` route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub prediction: Label,
    pub confidence: f32,
    pub mock: bool,
}

#[derive(Debug)]
pub struct AuthenticityEngine {
    extractor: EmbeddingExtractor,
    scorer: SimilarityScorer,
    references: ReferenceSetLoader,
}

enum Scored {
    Outcome(ScoreOutcome),
    Fallback(u8),
}

impl AuthenticityEngine {
    pub fn new(
        extractor: EmbeddingExtractor,
        scorer: SimilarityScorer,
        references: ReferenceSetLoader,
    ) -> Self {
        Self {
            extractor,
            scorer,
            references,
        }
    }

    /// Loads the extractor (possibly in fallback mode) and prepares a lazy
    /// reference loader from `config`.
    pub fn from_config(config: &Config) -> Result<Self, EngineError> {
        let extractor = EmbeddingExtractor::load(config.extractor_config())?;
        let scorer = SimilarityScorer::new(config.scoring.clone())?;
        let sources = config.reference_sources()?;

        info!(
            mode = extractor.mode().name(),
            reference_sources = sources.len(),
            threshold = scorer.threshold(),
            "Authenticity engine configured"
        );

        Ok(Self::new(extractor, scorer, ReferenceSetLoader::new(sources)))
    }

    /// Builds the reference set now instead of on the first request.
    ///
    /// Returns the number of references, or `None` in fallback mode.
    pub fn warm_up(&self) -> Result<Option<usize>, EngineError> {
        if self.extractor.is_fallback() {
            return Ok(None);
        }
        Ok(Some(self.reference_set()?.len()))
    }

    /// Runs validate → extract → score → assemble on raw image bytes.
    #[instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn analyze(&self, bytes: &[u8]) -> Result<AuthenticityReport, EngineError> {
        let embedding = self.extractor.extract(bytes)?;
        let preview_len = self.scorer.config().embedding_preview_len;

        let report = match self.score_embedding(&embedding)? {
            Scored::Outcome(outcome) => assemble(
                ReportInput {
                    score: outcome.score,
                    label: Some(outcome.label),
                    embedding: Some(&embedding),
                    ranked: outcome.ranked,
                    mock: false,
                    extractor: self.extractor.mode().name().to_string(),
                    policy: outcome.policy,
                },
                preview_len,
            ),
            Scored::Fallback(score) => assemble(
                ReportInput {
                    score,
                    label: None,
                    embedding: Some(&embedding),
                    ranked: Vec::new(),
                    mock: true,
                    extractor: self.extractor.mode().name().to_string(),
                    policy: ScorePolicy::Fallback,
                },
                preview_len,
            ),
        };

        debug!(
            score = report.score(),
            mock = report.is_mock(),
            similar = report.similar().len(),
            "Report assembled"
        );
        Ok(report)
    }

    /// Label and confidence only; nothing is signed, uploaded or stored.
    #[instrument(skip_all, fields(bytes = bytes.len()))]
    pub fn predict(&self, bytes: &[u8]) -> Result<Prediction, EngineError> {
        let embedding = self.extractor.extract(bytes)?;

        let prediction = match self.score_embedding(&embedding)? {
            Scored::Outcome(outcome) => Prediction {
                prediction: outcome.label,
                confidence: outcome.confidence,
                mock: false,
            },
            Scored::Fallback(score) => {
                let confidence = f32::from(score) / 100.0;
                Prediction {
                    prediction: Label::from_threshold(confidence, self.scorer.threshold()),
                    confidence,
                    mock: true,
                }
            }
        };
        Ok(prediction)
    }

    fn score_embedding(&self, embedding: &EmbeddingVector) -> Result<Scored, EngineError> {
        match self.extractor.mode() {
            ExtractorMode::Fallback => Ok(Scored::Fallback(
                self.scorer.fallback_score(&mut rand::thread_rng()),
            )),
            ExtractorMode::Real(_) => {
                let refs = self.reference_set()?;
                Ok(Scored::Outcome(self.scorer.score(embedding, &refs)?))
            }
        }
    }

    fn reference_set(&self) -> Result<Arc<ReferenceSet>, EngineError> {
        Ok(self.references.get_or_load(&self.extractor)?)
    }

    pub fn extractor(&self) -> &EmbeddingExtractor {
        &self.extractor
    }

    pub fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    pub fn is_fallback(&self) -> bool {
        self.extractor.is_fallback()
    }

    /// Size of the reference set, if it has been built.
    pub fn reference_count(&self) -> Option<usize> {
        self.references.get().map(|set| set.len())
    }
}
