// Generative-AI proxy routes
use axum::routing::post;
use axum::Router;
use std::sync::Arc;

use crate::app::AppState;
use crate::handlers::ai;

pub fn create_ai_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/ai/recommendations", post(ai::recommendations))
}
