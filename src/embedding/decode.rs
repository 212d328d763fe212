use std::io::Cursor;

use image::{DynamicImage, ImageReader, Limits};
use tracing::debug;

use super::error::EmbeddingError;
use crate::constants::MAX_IMAGE_DIMENSION;

/// Validates size and decodes an uploaded image.
///
/// Rejects empty payloads, payloads over `max_bytes`, undecodable data,
/// oversized dimensions and zero-area images with [`EmbeddingError::InvalidImage`].
/// No model is touched.
pub fn decode_image(bytes: &[u8], max_bytes: usize) -> Result<DynamicImage, EmbeddingError> {
    if bytes.len() > max_bytes {
        return Err(EmbeddingError::InvalidImage {
            reason: format!(
                "image is {} bytes, limit is {} bytes",
                bytes.len(),
                max_bytes
            ),
        });
    }

    decode_bounded(bytes)
}

/// Decodes a curated reference image.
///
/// Same checks as [`decode_image`] except the upload byte cap.
pub fn decode_reference(bytes: &[u8]) -> Result<DynamicImage, EmbeddingError> {
    decode_bounded(bytes)
}

fn decode_bounded(bytes: &[u8]) -> Result<DynamicImage, EmbeddingError> {
    if bytes.is_empty() {
        return Err(EmbeddingError::InvalidImage {
            reason: "empty image payload".to_string(),
        });
    }

    let invalid = |reason: String| EmbeddingError::InvalidImage { reason };

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| invalid(e.to_string()))?;

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_IMAGE_DIMENSION);
    limits.max_image_height = Some(MAX_IMAGE_DIMENSION);
    reader.limits(limits);

    let image = reader.decode().map_err(|e| invalid(e.to_string()))?;

    if image.width() == 0 || image.height() == 0 {
        return Err(invalid("image has zero area".to_string()));
    }

    debug!(
        width = image.width(),
        height = image.height(),
        bytes = bytes.len(),
        "Decoded image"
    );

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_pixel(8, 8, Rgb([73, 109, 137]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_empty_bytes_rejected() {
        let err = decode_image(&[], 1024).unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidImage { .. }));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_oversized_rejected_before_decode() {
        let bytes = png_bytes();
        let err = decode_image(&bytes, bytes.len() - 1).unwrap_err();
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn test_garbage_rejected() {
        let err = decode_image(b"definitely not an image", 1024).unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidImage { .. }));
    }

    #[test]
    fn test_valid_png_decodes() {
        let image = decode_image(&png_bytes(), 1024 * 1024).unwrap();
        assert_eq!((image.width(), image.height()), (8, 8));
    }

    #[test]
    fn test_dimensions_over_limit_rejected() {
        let wide = RgbImage::from_pixel(MAX_IMAGE_DIMENSION + 1, 1, Rgb([0, 0, 0]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(wide)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();

        let err = decode_image(&buf, usize::MAX).unwrap_err();
        assert!(matches!(err, EmbeddingError::InvalidImage { .. }));
        assert!(decode_reference(&buf).is_err());
    }

    #[test]
    fn test_reference_decode_ignores_upload_cap() {
        let bytes = png_bytes();
        assert!(decode_image(&bytes, 1).is_err());
        assert_eq!(decode_reference(&bytes).unwrap().width(), 8);
    }
}
