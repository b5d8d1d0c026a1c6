// Public routes: probes and API documentation
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_docs;
use crate::app::AppState;
use crate::handlers::health;

pub fn create_public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", api_docs::ApiDoc::openapi()),
        )
        .route("/", get(root))
        .route("/api/health", get(health::health))
        .route("/api/version", get(health::get_version))
}

async fn root() -> &'static str {
    "Cloudscope Backend API"
}
