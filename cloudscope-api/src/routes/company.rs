// Company onboarding routes: profile, instance inventory, CSV import
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;

use crate::app::AppState;
use crate::handlers::company;

/// Multipart framing overhead allowed on top of the file size limit.
const MULTIPART_SLACK_BYTES: usize = 64 * 1024;

pub fn create_company_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/company/profile",
            get(company::get_profile).post(company::set_profile),
        )
        .route("/api/company/instance", post(company::add_instance))
        .route("/api/company/instances", get(company::list_instances))
        .route(
            "/api/company/import-csv",
            post(company::import_csv).layer(DefaultBodyLimit::max(
                state.max_upload_bytes.saturating_add(MULTIPART_SLACK_BYTES),
            )),
        )
}
