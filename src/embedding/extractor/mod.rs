//! Embedding extractor: image bytes → [`EmbeddingVector`].
//!
//! The operating mode is chosen once in [`EmbeddingExtractor::load`] and never
//! changes afterwards. Use [`ExtractorConfig::fallback`] for tests/examples
//! without model files.

/// Extractor configuration.
pub mod config;


pub use config::ExtractorConfig;

use std::sync::Arc;

use image::DynamicImage;
use rand::Rng;
use rand_distr::StandardNormal;
use tracing::{debug, info, warn};

use crate::embedding::clip::ClipImageEncoder;
use crate::embedding::decode::decode_image;
use crate::embedding::encoder::ImageEncoder;
use crate::embedding::error::EmbeddingError;
use crate::embedding::vector::EmbeddingVector;

/// Which backend produces embeddings.
#[derive(Clone)]
pub enum ExtractorMode {
    /// A loaded feature extractor; embeddings are deterministic.
    Real(Arc<dyn ImageEncoder>),
    /// No extractor could be loaded; embeddings are random and non-authoritative.
    Fallback,
}

impl ExtractorMode {
    /// Label used in logs, readiness output and report metadata.
    pub fn name(&self) -> &str {
        match self {
            ExtractorMode::Real(encoder) => encoder.name(),
            ExtractorMode::Fallback => "fallback",
        }
    }

    /// Compute device of the loaded encoder; `None` in fallback mode.
    pub fn device(&self) -> Option<&str> {
        match self {
            ExtractorMode::Real(encoder) => Some(encoder.device()),
            ExtractorMode::Fallback => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ExtractorMode::Fallback)
    }
}

impl std::fmt::Debug for ExtractorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractorMode::Real(encoder) => write!(f, "Real({})", encoder.name()),
            ExtractorMode::Fallback => write!(f, "Fallback"),
        }
    }
}

/// Maps image bytes to embeddings using the mode selected at startup.
pub struct EmbeddingExtractor {
    mode: ExtractorMode,
    config: ExtractorConfig,
}

impl std::fmt::Debug for EmbeddingExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingExtractor")
            .field("mode", &self.mode)
            .field("embedding_dim", &self.dim())
            .field("normalize", &self.config.normalize)
            .finish()
    }
}

impl EmbeddingExtractor {
    /// Loads the CLIP encoder, degrading to fallback mode when it is unavailable.
    ///
    /// Returns [`EmbeddingError::ExtractorUnavailable`] only when
    /// [`ExtractorConfig::require_model`] is set.
    pub fn load(config: ExtractorConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let Some(model_path) = config.model_path.clone() else {
            return Self::unavailable(config, "no model path configured".to_string());
        };

        match ClipImageEncoder::load(&model_path, config.image_size) {
            Ok(encoder) => Self::with_encoder(Arc::new(encoder), config),
            Err(e) if e.is_unavailable() => Self::unavailable(config, e.to_string()),
            Err(e) => Err(e),
        }
    }

    fn unavailable(config: ExtractorConfig, reason: String) -> Result<Self, EmbeddingError> {
        if config.require_model {
            return Err(EmbeddingError::ExtractorUnavailable { reason });
        }

        warn!(
            reason = %reason,
            embedding_dim = config.embedding_dim,
            "Feature extractor unavailable, running in FALLBACK mode (reports are non-authoritative)"
        );
        Ok(Self::fallback(config))
    }

    /// Builds a real-mode extractor around an already loaded encoder.
    pub fn with_encoder(
        encoder: Arc<dyn ImageEncoder>,
        mut config: ExtractorConfig,
    ) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if encoder.dim() == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!("encoder '{}' reports zero dimension", encoder.name()),
            });
        }

        if encoder.dim() != config.embedding_dim {
            debug!(
                configured = config.embedding_dim,
                encoder = encoder.dim(),
                "Using encoder output dimension"
            );
            config.embedding_dim = encoder.dim();
        }

        info!(
            encoder = encoder.name(),
            embedding_dim = config.embedding_dim,
            normalize = config.normalize,
            "Embedding extractor ready"
        );

        Ok(Self {
            mode: ExtractorMode::Real(encoder),
            config,
        })
    }

    /// Builds a fallback-mode extractor (random standard-normal embeddings).
    pub fn fallback(config: ExtractorConfig) -> Self {
        Self {
            mode: ExtractorMode::Fallback,
            config,
        }
    }

    /// Validates and embeds raw image bytes.
    ///
    /// Invalid input is rejected in both modes before any model call.
    pub fn extract(&self, bytes: &[u8]) -> Result<EmbeddingVector, EmbeddingError> {
        let image = decode_image(bytes, self.config.max_image_bytes)?;
        self.extract_image(&image)
    }

    /// Embeds an already decoded image.
    pub fn extract_image(&self, image: &DynamicImage) -> Result<EmbeddingVector, EmbeddingError> {
        match &self.mode {
            ExtractorMode::Real(encoder) => self.encode_real(encoder.as_ref(), image),
            ExtractorMode::Fallback => Ok(self.random_embedding(&mut rand::thread_rng())),
        }
    }

    fn encode_real(
        &self,
        encoder: &dyn ImageEncoder,
        image: &DynamicImage,
    ) -> Result<EmbeddingVector, EmbeddingError> {
        let values = encoder.encode(image)?;

        if values.len() != self.config.embedding_dim {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.config.embedding_dim,
                actual: values.len(),
            });
        }

        let embedding = EmbeddingVector::new(values);
        if self.config.normalize {
            Ok(embedding.l2_normalized())
        } else {
            Ok(embedding)
        }
    }

    /// Draws a fallback embedding of dimension D from the standard normal distribution.
    pub fn random_embedding<R: Rng>(&self, rng: &mut R) -> EmbeddingVector {
        let values = (0..self.config.embedding_dim)
            .map(|_| rng.sample::<f32, _>(StandardNormal))
            .collect();
        EmbeddingVector::new(values)
    }

    /// Returns the real encoder, or [`EmbeddingError::ExtractorUnavailable`] in fallback mode.
    pub fn require_real(&self) -> Result<&Arc<dyn ImageEncoder>, EmbeddingError> {
        match &self.mode {
            ExtractorMode::Real(encoder) => Ok(encoder),
            ExtractorMode::Fallback => Err(EmbeddingError::ExtractorUnavailable {
                reason: "extractor is running in fallback mode".to_string(),
            }),
        }
    }

    pub fn mode(&self) -> &ExtractorMode {
        &self.mode
    }

    pub fn is_fallback(&self) -> bool {
        self.mode.is_fallback()
    }

    /// Output embedding dimension D.
    pub fn dim(&self) -> usize {
        self.config.embedding_dim
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }
}
