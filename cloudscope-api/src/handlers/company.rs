use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use chrono::Utc;
use cloudscope_common::schema::{parse_instance, parse_profile};
use cloudscope_common::{CloudInstanceRecord, CompanyProfile, SchemaError};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::app::AppState;
use crate::csv_import::{self, RowError};
use crate::error::{ApiError, ApiResult};
use crate::handlers::parse_json_body;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ProfileSavedResponse {
    pub success: bool,
    pub profile: CompanyProfile,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct InstanceSavedResponse {
    pub success: bool,
    pub instance: CloudInstanceRecord,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct InstanceListResponse {
    pub instances: Vec<CloudInstanceRecord>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ImportResponse {
    pub success: bool,
    pub imported: usize,
    pub errors: Vec<RowError>,
    /// Full inventory after the import.
    pub instances: Vec<CloudInstanceRecord>,
}

fn rejected(message: &'static str, err: SchemaError) -> ApiError {
    match err {
        SchemaError::Invalid(details) => ApiError::Validation { message, details },
        SchemaError::Shape(e) => ApiError::Internal(e.to_string()),
    }
}

#[utoipa::path(
    post,
    path = "/api/company/profile",
    request_body = CompanyProfile,
    responses(
        (status = 200, description = "Profile stored, replacing any previous one", body = ProfileSavedResponse),
        (status = 400, description = "Invalid profile")
    )
)]
pub async fn set_profile(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<ProfileSavedResponse>> {
    let input = parse_json_body(&body)?;
    let profile = parse_profile(&input).map_err(|e| rejected("Invalid profile", e))?;
    let profile = state.repo.set_profile(profile).await?;
    tracing::info!(company = %profile.name, "company profile saved");
    Ok(Json(ProfileSavedResponse {
        success: true,
        profile,
    }))
}

#[utoipa::path(
    get,
    path = "/api/company/profile",
    responses(
        (status = 200, description = "Current profile", body = CompanyProfile),
        (status = 404, description = "No profile yet")
    )
)]
pub async fn get_profile(State(state): State<Arc<AppState>>) -> ApiResult<Json<CompanyProfile>> {
    state
        .repo
        .get_profile()
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("No profile"))
}

#[utoipa::path(
    post,
    path = "/api/company/instance",
    request_body = cloudscope_common::NewCloudInstance,
    responses(
        (status = 200, description = "Instance stored with a generated id", body = InstanceSavedResponse),
        (status = 400, description = "Invalid instance")
    )
)]
pub async fn add_instance(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<InstanceSavedResponse>> {
    let input = parse_json_body(&body)?;
    let instance = parse_instance(&input).map_err(|e| rejected("Invalid instance", e))?;
    let instance = state.repo.add_instance(instance).await?;
    tracing::info!(id = %instance.id, name = %instance.instance.name, "instance added");
    Ok(Json(InstanceSavedResponse {
        success: true,
        instance,
    }))
}

#[utoipa::path(
    get,
    path = "/api/company/instances",
    responses((status = 200, description = "All instances in insertion order", body = InstanceListResponse))
)]
pub async fn list_instances(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<InstanceListResponse>> {
    let instances = state.repo.list_instances().await?;
    Ok(Json(InstanceListResponse { instances }))
}

#[utoipa::path(
    post,
    path = "/api/company/import-csv",
    request_body(content = String, content_type = "multipart/form-data", description = "CSV file in the `file` field"),
    responses(
        (status = 200, description = "Valid rows imported; invalid rows reported", body = ImportResponse),
        (status = 400, description = "Missing file, empty file or header mismatch"),
        (status = 413, description = "Upload too large")
    )
)]
pub async fn import_csv(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ImportResponse>> {
    let multipart = multipart.map_err(|_| ApiError::BadRequest("File required".to_string()))?;
    let upload = spool_upload(multipart, &state.upload_dir, state.max_upload_bytes).await?;

    let path = upload.path().to_path_buf();
    let now = Utc::now();
    let parsed = tokio::task::spawn_blocking(move || csv_import::parse_file(&path, now)).await;
    discard_upload(upload);

    let outcome = parsed.map_err(|e| ApiError::Internal(format!("CSV parser task failed: {e}")))??;
    let rejected_rows = outcome.errors.len();
    let stored = state.repo.add_instances(outcome.parsed).await?;
    tracing::info!(imported = stored.len(), rejected = rejected_rows, "csv import finished");

    let instances = state.repo.list_instances().await?;
    Ok(Json(ImportResponse {
        success: true,
        imported: stored.len(),
        errors: outcome.errors,
        instances,
    }))
}

/// Stream the `file` field to a temp file in `dir`. The file is deleted when the
/// returned handle is dropped, so early returns clean up too.
async fn spool_upload(
    mut multipart: Multipart,
    dir: &Path,
    limit: usize,
) -> ApiResult<NamedTempFile> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let tmp = tempfile::Builder::new()
            .prefix("csv-import-")
            .suffix(".csv")
            .tempfile_in(dir)
            .map_err(|e| ApiError::Internal(format!("cannot create upload file: {e}")))?;
        let handle = tmp
            .as_file()
            .try_clone()
            .map_err(|e| ApiError::Internal(format!("cannot open upload file: {e}")))?;
        let mut out = tokio::fs::File::from_std(handle);

        let mut written = 0usize;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| ApiError::BadRequest(e.to_string()))?
        {
            written += chunk.len();
            if written > limit {
                return Err(ApiError::PayloadTooLarge { limit });
            }
            out.write_all(&chunk)
                .await
                .map_err(|e| ApiError::Internal(format!("cannot write upload file: {e}")))?;
        }
        out.flush()
            .await
            .map_err(|e| ApiError::Internal(format!("cannot write upload file: {e}")))?;
        return Ok(tmp);
    }

    Err(ApiError::BadRequest("File required".to_string()))
}

fn discard_upload(upload: NamedTempFile) {
    let path = upload.path().to_path_buf();
    if let Err(e) = upload.close() {
        tracing::warn!(path = %path.display(), error = %e, "failed to remove uploaded CSV");
    }
}
