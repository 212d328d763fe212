use std::path::PathBuf;

use crate::constants::{DEFAULT_EMBEDDING_DIM, DEFAULT_IMAGE_SIZE, DEFAULT_MAX_IMAGE_BYTES};
use crate::embedding::error::EmbeddingError;

#[derive(Debug, Clone)]
/// Configuration for [`EmbeddingExtractor`](super::EmbeddingExtractor).
pub struct ExtractorConfig {
    /// CLIP weights (`model.safetensors` or its directory). `None` selects fallback mode.
    pub model_path: Option<PathBuf>,
    /// Output embedding dimension D (fallback vectors use the same D).
    pub embedding_dim: usize,
    /// Square input resolution fed to the encoder.
    pub image_size: usize,
    /// Uploads above this size are rejected as invalid.
    pub max_image_bytes: usize,
    /// L2-normalize real-mode embeddings before scoring.
    pub normalize: bool,
    /// If true, failing to load the model is a startup error instead of a fallback.
    pub require_model: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
            image_size: DEFAULT_IMAGE_SIZE,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            normalize: false,
            require_model: false,
        }
    }
}

impl ExtractorConfig {
    /// Creates a config pointing at CLIP weights.
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    /// Creates a config with no model (fallback mode).
    pub fn fallback() -> Self {
        Self::default()
    }

    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    pub fn with_normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    pub fn with_max_image_bytes(mut self, max_image_bytes: usize) -> Self {
        self.max_image_bytes = max_image_bytes;
        self
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be non-zero".to_string(),
            });
        }

        if self.image_size == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "image_size must be non-zero".to_string(),
            });
        }

        if self.max_image_bytes == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_image_bytes must be non-zero".to_string(),
            });
        }

        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_path cannot be empty when provided".to_string(),
            });
        }

        Ok(())
    }
}
