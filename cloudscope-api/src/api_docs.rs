use crate::csv_import::RowError;
use crate::handlers::{ai, company, health};
use crate::version::VersionInfo;
use cloudscope_common::schema::{FieldError, Violation};
use cloudscope_common::{
    CloudInstanceRecord, CloudProvider, CompanyProfile, Environment, InstanceStatus,
    NewCloudInstance, Recommendation,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        // Company onboarding
        company::set_profile,
        company::get_profile,
        company::add_instance,
        company::list_instances,
        company::import_csv,
        // AI
        ai::recommendations,
        // Probes
        health::health,
        health::get_version
    ),
    components(
        schemas(
            CompanyProfile,
            NewCloudInstance,
            CloudInstanceRecord,
            CloudProvider,
            Environment,
            InstanceStatus,
            Recommendation,
            FieldError,
            Violation,
            RowError,
            company::ProfileSavedResponse,
            company::InstanceSavedResponse,
            company::InstanceListResponse,
            company::ImportResponse,
            ai::RecommendationRequest,
            ai::RecommendationsResponse,
            health::HealthResponse,
            VersionInfo
        )
    ),
    tags(
        (name = "cloudscope-backend", description = "Multi-cloud cost dashboard API")
    )
)]
pub struct ApiDoc;
