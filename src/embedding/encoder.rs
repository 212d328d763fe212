use image::DynamicImage;

use super::error::EmbeddingError;

/// A pretrained feature extractor that maps a decoded image to a raw embedding.
///
/// Implementations hold their weights immutably; `encode` must be a pure function
/// of the image so that the reference set and queries share one embedding space.
pub trait ImageEncoder: Send + Sync {
    /// Short identifier recorded in report metadata.
    fn name(&self) -> &str;

    /// Output dimension D.
    fn dim(&self) -> usize;

    /// Compute device the forward pass runs on.
    fn device(&self) -> &str {
        "cpu"
    }

    /// Runs the forward pass. Returns exactly [`dim`](Self::dim) values.
    fn encode(&self, image: &DynamicImage) -> Result<Vec<f32>, EmbeddingError>;
}
