// Handlers module - Centralizes all request handlers
pub mod ai;
pub mod company;
pub mod health;

use axum::body::Bytes;
use serde_json::Value;

use crate::error::ApiError;

/// Parse a raw JSON body so malformed input gets the same JSON error shape as everything else.
pub(crate) fn parse_json_body(body: &Bytes) -> Result<Value, ApiError> {
    serde_json::from_slice(body).map_err(|e| ApiError::InvalidJson(e.to_string()))
}

pub(crate) fn is_blank_body(body: &Bytes) -> bool {
    body.iter().all(u8::is_ascii_whitespace)
}
