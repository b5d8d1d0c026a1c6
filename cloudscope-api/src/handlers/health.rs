use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::version;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Liveness probe", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "backend",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Get version information (public endpoint)
#[utoipa::path(
    get,
    path = "/api/version",
    responses((status = 200, description = "Service version", body = version::VersionInfo))
)]
pub async fn get_version() -> Json<version::VersionInfo> {
    Json(version::get_version_info())
}
