use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{Span, debug, info, instrument, warn};

use super::ARTIFY_STATUS_HEADER;
use crate::gateway::error::GatewayError;
use crate::gateway::payload::{InferResponse, PredictResponse, read_image_upload};
use crate::gateway::state::AppState;
use crate::signing::sign_report;

fn status_headers(mock: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ARTIFY_STATUS_HEADER,
        HeaderValue::from_static(if mock { "mock" } else { "ok" }),
    );
    headers
}

/// `POST /infer`: analyze → sign → upload → persist (best effort).
#[instrument(
    skip_all,
    fields(filename = tracing::field::Empty, bytes = tracing::field::Empty)
)]
pub async fn infer_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, GatewayError> {
    let upload = read_image_upload(multipart).await?;
    Span::current().record("filename", upload.filename.as_str());
    Span::current().record("bytes", upload.bytes.len());

    let engine = state.engine.clone();
    let image = upload.bytes.clone();
    let report = tokio::task::spawn_blocking(move || engine.analyze(&image))
        .await
        .map_err(|e| GatewayError::InternalError(format!("analysis task failed: {e}")))??;

    let report = sign_report(state.signer.as_ref(), report)?;
    let report_json = serde_json::to_vec(&report)
        .map_err(|e| GatewayError::SerializationFailed(e.to_string()))?;

    let content_id = state
        .store
        .put(&upload.filename, upload.bytes.to_vec(), report_json)
        .await?;

    match state
        .records
        .save(&content_id, upload.uploader.as_deref(), &report)
        .await
    {
        Ok(record_id) => debug!(%record_id, content_id = %content_id, "Record saved"),
        Err(e) => warn!(error = %e, content_id = %content_id, "Failed to persist record, continuing"),
    }

    info!(
        content_id = %content_id,
        score = report.score(),
        mock = report.is_mock(),
        "Inference complete"
    );

    let headers = status_headers(report.is_mock());
    Ok((
        StatusCode::OK,
        headers,
        Json(InferResponse { content_id, report }),
    )
        .into_response())
}

/// `POST /predict`: label and confidence only; nothing is signed, uploaded or stored.
#[instrument(skip_all, fields(bytes = tracing::field::Empty))]
pub async fn predict_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, GatewayError> {
    let upload = read_image_upload(multipart).await?;
    Span::current().record("bytes", upload.bytes.len());

    let engine = state.engine.clone();
    let prediction = tokio::task::spawn_blocking(move || engine.predict(&upload.bytes))
        .await
        .map_err(|e| GatewayError::InternalError(format!("prediction task failed: {e}")))??;

    debug!(
        prediction = %prediction.prediction,
        confidence = prediction.confidence,
        "Prediction complete"
    );

    Ok((
        StatusCode::OK,
        status_headers(prediction.mock),
        Json(PredictResponse::from(prediction)),
    )
        .into_response())
}
