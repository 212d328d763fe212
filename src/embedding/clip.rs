//! CLIP ViT-B/32 image tower (safetensors weights via candle).

use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::clip::{ClipConfig, ClipModel};
use image::DynamicImage;
use image::imageops::FilterType;
use tracing::{debug, info};

use super::device::{DeviceKind, select_device};
use super::encoder::ImageEncoder;
use super::error::EmbeddingError;

/// Projection dimension of `openai/clip-vit-base-patch32`.
pub const CLIP_EMBEDDING_DIM: usize = 512;

const CLIP_MEAN: [f32; 3] = [0.481_454_66, 0.457_827_5, 0.408_210_73];
const CLIP_STD: [f32; 3] = [0.268_629_54, 0.261_302_6, 0.275_777_1];

const ENCODER_NAME: &str = "clip-vit-base-patch32";

pub struct ClipImageEncoder {
    model: ClipModel,
    device: Device,
    device_kind: DeviceKind,
    image_size: usize,
}

impl std::fmt::Debug for ClipImageEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipImageEncoder")
            .field("device", &self.device_kind)
            .field("image_size", &self.image_size)
            .finish()
    }
}

impl ClipImageEncoder {
    /// Loads weights from a `model.safetensors` file, or from a directory containing one.
    pub fn load(model_path: &Path, image_size: usize) -> Result<Self, EmbeddingError> {
        let weights_path = if model_path.is_dir() {
            model_path.join("model.safetensors")
        } else {
            model_path.to_path_buf()
        };

        if !weights_path.is_file() {
            return Err(EmbeddingError::ModelNotFound { path: weights_path });
        }

        let (device, device_kind) = select_device();
        debug!(device = %device_kind, "Selected compute device for CLIP");

        let config = ClipConfig::vit_base_patch32();

        // SAFETY: the weights file is mapped read-only and must not be modified while loaded.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.as_path()], DType::F32, &device)
        }
        .map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("Failed to map safetensors: {}", e),
        })?;

        let model = ClipModel::new(vb, &config).map_err(|e| EmbeddingError::ModelLoadFailed {
            reason: format!("Failed to build CLIP model: {}", e),
        })?;

        info!(
            weights = %weights_path.display(),
            device = %device_kind,
            image_size,
            embedding_dim = CLIP_EMBEDDING_DIM,
            "CLIP image encoder loaded"
        );

        Ok(Self {
            model,
            device,
            device_kind,
            image_size,
        })
    }

    /// Resizes to `image_size`², converts to RGB and applies CLIP mean/std normalization.
    ///
    /// Output shape: `[1, 3, image_size, image_size]`.
    fn preprocess(&self, image: &DynamicImage) -> Result<Tensor, EmbeddingError> {
        let size = self.image_size;
        let rgb = image
            .resize_exact(size as u32, size as u32, FilterType::Triangle)
            .to_rgb8()
            .into_raw();

        let pixels = Tensor::from_vec(rgb, (size, size, 3), &self.device)?
            .permute((2, 0, 1))?
            .to_dtype(DType::F32)?
            .affine(1.0 / 255.0, 0.0)?;

        let mean = Tensor::new(&CLIP_MEAN, &self.device)?.reshape((3, 1, 1))?;
        let std = Tensor::new(&CLIP_STD, &self.device)?.reshape((3, 1, 1))?;

        Ok(pixels
            .broadcast_sub(&mean)?
            .broadcast_div(&std)?
            .unsqueeze(0)?)
    }
}

impl ImageEncoder for ClipImageEncoder {
    fn name(&self) -> &str {
        ENCODER_NAME
    }

    fn dim(&self) -> usize {
        CLIP_EMBEDDING_DIM
    }

    fn device(&self) -> &str {
        self.device_kind.as_str()
    }

    fn encode(&self, image: &DynamicImage) -> Result<Vec<f32>, EmbeddingError> {
        let pixel_values = self.preprocess(image)?;

        let features = self
            .model
            .get_image_features(&pixel_values)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("CLIP forward pass failed: {}", e),
            })?;

        let values = features.squeeze(0)?.to_dtype(DType::F32)?.to_vec1::<f32>()?;

        if values.len() != CLIP_EMBEDDING_DIM {
            return Err(EmbeddingError::DimensionMismatch {
                expected: CLIP_EMBEDDING_DIM,
                actual: values.len(),
            });
        }

        Ok(values)
    }
}
