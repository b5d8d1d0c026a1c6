// Routes module - Centralizes all route definitions
pub mod ai;
pub mod company;
pub mod public;

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::app::{create_cors, AppState};

/// Build the main application router
pub fn create_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .merge(public::create_public_routes())
        .merge(company::create_company_routes(state.clone()))
        .merge(ai::create_ai_routes())
}

/// Router with state, CORS and request tracing applied; what `main` serves.
pub fn build_app(state: Arc<AppState>) -> Router {
    create_router(state.clone())
        .layer(create_cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
