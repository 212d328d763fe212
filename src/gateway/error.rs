use axum::{
    Json,
    extract::multipart::MultipartError,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use super::ARTIFY_STATUS_HEADER;
use crate::engine::EngineError;
use crate::signing::SigningError;
use crate::store::UploadError;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Malformed multipart body or missing `file` field.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Multipart stream could not be read (includes body-limit overruns).
    #[error("invalid multipart body: {}", .0.body_text())]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Pipeline(#[from] EngineError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("serialization failed: {0}")]
    SerializationFailed(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

impl GatewayError {
    fn status_tag(&self) -> &'static str {
        match self {
            GatewayError::InvalidRequest(_) => "invalid_request",
            GatewayError::Multipart(_) => "invalid_multipart",
            GatewayError::Pipeline(e) if e.is_invalid_input() => "invalid_image",
            GatewayError::Pipeline(_) => "pipeline_error",
            GatewayError::Signing(SigningError::SigningUnconfigured) => "signing_unconfigured",
            GatewayError::Signing(_) => "signing_error",
            GatewayError::Upload(_) => "upload_failed",
            GatewayError::SerializationFailed(_) => "serialization_error",
            GatewayError::InternalError(_) => "internal_error",
        }
    }
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::Multipart(e) => e.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let tag = self.status_tag();

        if status.is_server_error() {
            error!(error = %self, status = tag, "Request failed");
        }

        let mut headers = HeaderMap::new();
        headers.insert(ARTIFY_STATUS_HEADER, HeaderValue::from_static(tag));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
