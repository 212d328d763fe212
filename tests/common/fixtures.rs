//! Test fixtures for integration tests.

use std::sync::Arc;

use artify::{
    AuthenticityEngine, EmbeddingExtractor, ExtractorConfig, MockImageEncoder, ReferenceSetLoader,
    ReferenceSource, ScoringConfig, SimilarityScorer, solid_png,
};

pub const MOCK_DIM: usize = 64;

pub const TEST_SIGNER_KEY_HEX: &str =
    "0x000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

pub const RED: [u8; 3] = [210, 30, 30];
pub const GREEN: [u8; 3] = [30, 210, 30];
pub const BLUE: [u8; 3] = [30, 30, 210];

pub fn png(color: [u8; 3]) -> Vec<u8> {
    solid_png(color, 32)
}

pub fn mock_extractor() -> EmbeddingExtractor {
    EmbeddingExtractor::with_encoder(
        Arc::new(MockImageEncoder::new(MOCK_DIM)),
        ExtractorConfig::fallback().with_embedding_dim(MOCK_DIM),
    )
    .unwrap()
}

/// Reference sources named after their colours.
pub fn colour_references(colours: &[(&str, [u8; 3])]) -> Vec<ReferenceSource> {
    colours
        .iter()
        .map(|(id, colour)| ReferenceSource::bytes(*id, png(*colour)))
        .collect()
}

#[derive(Default)]
pub struct EngineBuilder {
    references: Vec<ReferenceSource>,
    scoring: Option<ScoringConfig>,
    fallback: bool,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn references(mut self, references: Vec<ReferenceSource>) -> Self {
        self.references = references;
        self
    }

    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = Some(scoring);
        self
    }

    pub fn fallback(mut self) -> Self {
        self.fallback = true;
        self
    }

    pub fn build(self) -> Arc<AuthenticityEngine> {
        let extractor = if self.fallback {
            EmbeddingExtractor::fallback(ExtractorConfig::fallback())
        } else {
            mock_extractor()
        };
        let scorer = SimilarityScorer::new(self.scoring.unwrap_or_default()).unwrap();
        Arc::new(AuthenticityEngine::new(
            extractor,
            scorer,
            ReferenceSetLoader::new(self.references),
        ))
    }
}
