//! HTTP request handlers for the detection service.
//!
//! Pipeline failures are logged with full detail server-side but leave the
//! process as a sanitized envelope, so model internals never reach callers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::DetectError;
use crate::service::DetectionService;
use crate::types::{AiSpan, Detection, Label};

/// Application state shared across handlers.
pub struct AppState {
    pub service: Arc<DetectionService>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    version: String,
}

/// Health check endpoint.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness response reporting backend slot state.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    status: String,
    guaranteed_backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    preferred_backend: Option<String>,
    preferred_usable: bool,
}

/// Readiness endpoint reporting which backends are serving.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> Json<ReadinessResponse> {
    Json(ReadinessResponse {
        status: "ready".to_string(),
        guaranteed_backend: state.service.guaranteed_name().to_string(),
        preferred_backend: state.service.preferred_name().map(String::from),
        preferred_usable: state.service.preferred_usable(),
    })
}

/// Request body for the detection endpoints.
#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    text: String,
}

/// Response body for the detection endpoints.
#[derive(Debug, Serialize)]
pub struct DetectResponse {
    label: Label,
    ai_probability: f64,
    certainty: f64,
    ai_spans: Vec<AiSpan>,
    model_used: String,
}

impl From<Detection> for DetectResponse {
    fn from(result: Detection) -> Self {
        Self {
            label: result.label,
            ai_probability: result.ai_probability,
            certainty: result.certainty,
            ai_spans: result.ai_spans,
            model_used: result.model_used,
        }
    }
}

/// Sanitized error envelope returned to callers.
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    code: u16,
    message: &'static str,
}

/// Boundary error mapping pipeline failures onto HTTP responses.
pub enum ApiError {
    /// Request failed validation before reaching the pipeline
    EmptyText,
    /// The detection pipeline failed
    Pipeline(DetectError),
}

impl From<DetectError> for ApiError {
    fn from(err: DetectError) -> Self {
        Self::Pipeline(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::EmptyText => {
                warn!("Rejected request with empty text");
                (StatusCode::UNPROCESSABLE_ENTITY, "Invalid request data")
            }
            ApiError::Pipeline(DetectError::UnknownBackend { name }) => {
                warn!(backend = %name, "Requested backend fills no slot");
                (StatusCode::NOT_FOUND, "Unknown backend")
            }
            ApiError::Pipeline(err) => {
                error!(error = %err, "Detection request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = ErrorBody {
            status: "error",
            code: status.as_u16(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Classify a document with fallback orchestration.
pub async fn detect_text(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DetectRequest>,
) -> Result<Json<DetectResponse>, ApiError> {
    if request.text.is_empty() {
        return Err(ApiError::EmptyText);
    }

    let result = state.service.detect(&request.text).await?;
    Ok(Json(result.into()))
}

/// Classify a document on one named backend, bypassing fallback.
pub async fn detect_text_with_backend(
    State(state): State<Arc<AppState>>,
    Path(backend): Path<String>,
    Json(request): Json<DetectRequest>,
) -> Result<Json<DetectResponse>, ApiError> {
    if request.text.is_empty() {
        return Err(ApiError::EmptyText);
    }

    let result = state.service.detect_with(&backend, &request.text).await?;
    Ok(Json(result.into()))
}
