use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cloudscope_common::FieldError;
use cloudscope_providers::ModelError;
use serde_json::json;

use crate::ai_proxy::ProxyError;
use crate::csv_import::ImportError;
use crate::store::StoreError;

/// Request-boundary error. Every variant renders as a JSON body with an `error` field.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Input failed a schema rule; `details` lists every violated field.
    #[error("{message}")]
    Validation {
        message: &'static str,
        details: Vec<FieldError>,
    },

    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("upload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Recommendation(#[from] ProxyError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                json!({"error": message, "details": details}),
            ),
            ApiError::InvalidJson(msg) => (
                StatusCode::BAD_REQUEST,
                json!({"error": "Invalid JSON body", "details": msg}),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({"error": msg})),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({"error": msg})),
            ApiError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({"error": format!("File too large (limit {limit} bytes)")}),
            ),
            ApiError::Import(e) => match &e {
                ImportError::InvalidHeaders { found } => (
                    StatusCode::BAD_REQUEST,
                    json!({"error": e.to_string(), "found": found}),
                ),
                _ => (StatusCode::BAD_REQUEST, json!({"error": e.to_string()})),
            },
            ApiError::Recommendation(e) => recommendation_error(e),
            ApiError::Store(e) => {
                tracing::error!(error = %e, "store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Storage failure"}),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": "Internal server error"}),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn recommendation_error(e: ProxyError) -> (StatusCode, serde_json::Value) {
    match e {
        ProxyError::NotConfigured => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Gemini API key not configured"}),
        ),
        ProxyError::Model(ModelError::Timeout(after)) => (
            StatusCode::GATEWAY_TIMEOUT,
            json!({
                "error": "Gemini request timed out",
                "details": format!("no response within {} ms", after.as_millis()),
            }),
        ),
        ProxyError::Model(other) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Gemini request failed", "details": other.to_string()}),
        ),
        ProxyError::Unparseable { raw } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Failed to parse Gemini output", "raw": raw}),
        ),
        ProxyError::Malformed { raw } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Invalid structure from Gemini", "raw": raw}),
        ),
    }
}
