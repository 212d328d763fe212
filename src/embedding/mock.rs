//! Deterministic image encoder for tests (no model weights).

use image::DynamicImage;
use image::imageops::FilterType;

use super::encoder::ImageEncoder;
use super::error::EmbeddingError;

/// Encodes an image as its downsampled, centered RGB pixels.
///
/// Identical images map to identical vectors and distinct solid colors map to
/// distinct directions, which is enough to exercise similarity scoring.
#[derive(Debug, Clone)]
pub struct MockImageEncoder {
    dim: usize,
}

impl MockImageEncoder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl ImageEncoder for MockImageEncoder {
    fn name(&self) -> &str {
        "mock"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn encode(&self, image: &DynamicImage) -> Result<Vec<f32>, EmbeddingError> {
        let pixels_needed = self.dim.div_ceil(3).max(1);
        let side = (pixels_needed as f64).sqrt().ceil() as u32;

        let rgb = image
            .resize_exact(side, side, FilterType::Triangle)
            .to_rgb8()
            .into_raw();

        Ok(rgb
            .into_iter()
            .take(self.dim)
            .map(|v| f32::from(v) / 255.0 - 0.5)
            .collect())
    }
}

/// Encodes a solid-color `side`x`side` PNG.
pub fn solid_png(color: [u8; 3], side: u32) -> Vec<u8> {
    let image = image::RgbImage::from_pixel(side, side, image::Rgb(color));
    let mut buf = Vec::new();
    // Writing into an in-memory buffer cannot fail for a valid RGB image.
    let _ = DynamicImage::ImageRgb8(image)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png);
    buf
}
