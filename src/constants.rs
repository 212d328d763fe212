//! Cross-cutting, shared constants.
//!
//! Secondary defaults (preview length, body limits) are derived from these where possible.

/// Output dimension of the CLIP ViT-B/32 image projection.
pub const DEFAULT_EMBEDDING_DIM: usize = 512;

/// Square input resolution expected by CLIP ViT-B/32.
pub const DEFAULT_IMAGE_SIZE: usize = 224;

/// Uploads larger than this are rejected before decoding.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5_000_000;

/// Max similarity must be strictly greater than this to label an image authentic.
pub const DEFAULT_AUTHENTICITY_THRESHOLD: f32 = 0.85;

/// Number of ranked reference matches included in a report.
pub const DEFAULT_TOP_K: usize = 2;

/// Number of embedding components copied into a report.
pub const DEFAULT_EMBEDDING_PREVIEW_LEN: usize = 128;

/// Lower bound (inclusive) of the score drawn in fallback mode.
pub const DEFAULT_FALLBACK_SCORE_MIN: u8 = 60;

/// Upper bound (exclusive) of the score drawn in fallback mode.
pub const DEFAULT_FALLBACK_SCORE_MAX: u8 = 80;

/// Reference images used when none are configured (skipped if absent).
pub const DEFAULT_REFERENCE_IMAGES: &[&str] = &[
    "ml/data/processed/authentic_images/authentic_0.jpg",
    "ml/data/processed/authentic_images/authentic_4.jpg",
];

/// Extra request body headroom on top of the image limit (multipart framing).
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Largest width or height accepted by the decoder; bounds the decoded bitmap.
pub const MAX_IMAGE_DIMENSION: u32 = 8192;
