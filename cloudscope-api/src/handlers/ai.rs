// AI recommendation handler
use axum::{body::Bytes, extract::State, Json};
use cloudscope_common::Recommendation;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::ai_proxy::{self, ProxyError, DEFAULT_OPTIMIZATION, DEFAULT_WORKLOAD};
use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::handlers::is_blank_body;

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    /// Defaults to `web-app-frontend`.
    pub workload: Option<String>,
    /// Defaults to `cost`.
    pub optimization_type: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub workload: String,
    pub optimization_type: String,
    pub recommendations: Vec<Recommendation>,
    /// Model backend that produced the text.
    pub source: String,
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[utoipa::path(
    post,
    path = "/api/ai/recommendations",
    request_body = RecommendationRequest,
    responses(
        (status = 200, description = "Exactly three normalized recommendations", body = RecommendationsResponse),
        (status = 500, description = "Missing credential, upstream failure or unusable model output"),
        (status = 504, description = "Model call timed out")
    )
)]
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<RecommendationsResponse>> {
    let req: RecommendationRequest = if is_blank_body(&body) {
        RecommendationRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidJson(e.to_string()))?
    };
    let workload = or_default(req.workload, DEFAULT_WORKLOAD);
    let optimization_type = or_default(req.optimization_type, DEFAULT_OPTIMIZATION);

    let Some(model) = state.model.as_ref() else {
        return Err(ProxyError::NotConfigured.into());
    };

    let recommendations = ai_proxy::recommend(model.as_ref(), &workload, &optimization_type).await?;

    Ok(Json(RecommendationsResponse {
        workload,
        optimization_type,
        recommendations,
        source: model.source().to_string(),
    }))
}
