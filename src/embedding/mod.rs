//! Embedding + model utilities.
//!
//! - [`extractor`] maps image bytes to an [`EmbeddingVector`] (real or fallback mode).
//! - [`clip`] is the production [`ImageEncoder`] (CLIP ViT-B/32 image tower).

/// CLIP image tower encoder.
pub mod clip;
/// Image validation + decoding.
pub mod decode;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Feature-extractor seam.
pub mod encoder;
mod error;
/// Embedding extractor (real vs. fallback mode).
pub mod extractor;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Embedding vector value type.
pub mod vector;

pub use clip::ClipImageEncoder;
pub use decode::decode_image;
pub use encoder::ImageEncoder;
pub use error::EmbeddingError;
pub use extractor::{EmbeddingExtractor, ExtractorConfig, ExtractorMode};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockImageEncoder, solid_png};
pub use vector::EmbeddingVector;
