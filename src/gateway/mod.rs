//! HTTP gateway (Axum) for image scoring.
//!
//! Routes: `GET /healthz`, `GET /ready`, `POST /infer`, `POST /predict`.

pub mod error;
pub mod handler;
pub mod payload;
pub mod state;


use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

pub use handler::{infer_handler, predict_handler};
pub use state::AppState;

use crate::config::Config;
use crate::constants::{DEFAULT_MAX_IMAGE_BYTES, MULTIPART_OVERHEAD_BYTES};

/// Response header carrying a short machine-readable outcome.
pub const ARTIFY_STATUS_HEADER: &str = "x-artify-status";
pub const ARTIFY_STATUS_HEALTHY: &str = "healthy";
pub const ARTIFY_STATUS_READY: &str = "ready";
pub const ARTIFY_STATUS_ERROR: &str = "error";

/// Router-level settings that are not part of the per-request state.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    /// Allowed CORS origins; `*` allows any.
    pub cors_origins: Vec<String>,
    /// Max request body size in bytes.
    pub body_limit: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            body_limit: DEFAULT_MAX_IMAGE_BYTES + MULTIPART_OVERHEAD_BYTES,
        }
    }
}

impl RouterOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cors_origins: config.cors_origins.clone(),
            body_limit: config.body_limit(),
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

pub fn create_router_with_state(state: AppState, options: &RouterOptions) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/infer", post(infer_handler))
        .route("/predict", post(predict_handler))
        .layer(DefaultBodyLimit::max(options.body_limit))
        .layer(cors_layer(&options.cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub storage: &'static str,
    pub extractor_mode: String,
    /// Compute device of the encoder; `None` in fallback mode.
    pub device: Option<String>,
    /// `None` until the reference set has been built (always `None` in fallback mode).
    pub reference_count: Option<usize>,
    pub signer: String,
    pub content_store: String,
    pub records: String,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        ARTIFY_STATUS_HEADER,
        HeaderValue::from_static(ARTIFY_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let storage_status = if state.storage_path.is_dir() {
        ARTIFY_STATUS_READY
    } else {
        ARTIFY_STATUS_ERROR
    };

    let components = ComponentStatus {
        http: ARTIFY_STATUS_READY,
        storage: storage_status,
        extractor_mode: state.engine.extractor().mode().name().to_string(),
        device: state.engine.extractor().mode().device().map(str::to_string),
        reference_count: state.engine.reference_count(),
        signer: state.signer.name().to_string(),
        content_store: state.store.name().to_string(),
        records: state.records.name().to_string(),
    };

    let is_ready = components.storage == ARTIFY_STATUS_READY;
    let status_code = if is_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let status_msg = if is_ready { "ok" } else { "pending" };

    let mut headers = HeaderMap::new();
    headers.insert(ARTIFY_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
        }),
    )
        .into_response()
}
