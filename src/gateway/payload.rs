use axum::body::Bytes;
use axum::extract::Multipart;
use serde::{Deserialize, Serialize};

use crate::engine::Prediction;
use crate::report::AuthenticityReport;
use crate::scoring::Label;

use super::error::GatewayError;

/// Multipart field carrying the image.
pub const FILE_FIELD: &str = "file";
/// Optional text field naming the uploader (persisted with the record).
pub const UPLOADER_FIELD: &str = "uploader";

const DEFAULT_FILENAME: &str = "upload.bin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferResponse {
    pub content_id: String,
    pub report: AuthenticityReport,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: Label,
    pub confidence: f32,
    pub mock: bool,
}

impl From<Prediction> for PredictResponse {
    fn from(p: Prediction) -> Self {
        Self {
            prediction: p.prediction,
            confidence: p.confidence,
            mock: p.mock,
        }
    }
}

#[derive(Debug)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Bytes,
    pub uploader: Option<String>,
}

/// Reads the `file` field (required) and `uploader` field (optional).
///
/// Unknown fields are skipped. A second `file` field is rejected.
pub async fn read_image_upload(mut multipart: Multipart) -> Result<ImageUpload, GatewayError> {
    let mut image: Option<(String, Bytes)> = None;
    let mut uploader = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                if image.is_some() {
                    return Err(GatewayError::InvalidRequest(format!(
                        "expected a single '{FILE_FIELD}' field"
                    )));
                }
                let filename = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(DEFAULT_FILENAME)
                    .to_string();
                let bytes = field.bytes().await?;
                image = Some((filename, bytes));
            }
            Some(UPLOADER_FIELD) => {
                let text = field.text().await?;
                let text = text.trim();
                if !text.is_empty() {
                    uploader = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    let (filename, bytes) = image.ok_or_else(|| {
        GatewayError::InvalidRequest(format!("missing multipart field '{FILE_FIELD}'"))
    })?;

    Ok(ImageUpload {
        filename,
        bytes,
        uploader,
    })
}
