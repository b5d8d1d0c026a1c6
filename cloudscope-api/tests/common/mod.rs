// Common test utilities and fixtures
#![allow(dead_code)]

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use cloudscope_api::app::AppState;
use cloudscope_api::routes::build_app;
use cloudscope_api::store::InMemoryRepository;
use cloudscope_providers::{GenerativeModel, MockModel};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const CSV_HEADER: &str = "name,provider,region,type,cpu,memoryGb,storageGb,monthlyCost,environment,status,cpuUtilization,memoryUtilization,networkInGb,networkOutGb,computeCost,storageCost,networkCost,tags,uptime,peakCpuUsage,avgResponseTime,requestsPerHour";
pub const CSV_ROW: &str = "api-server-01,aws,us-east-1,t3.medium,2,4,50,42,prod,running,70,60,10,15,35,5,2,web-server;prod;critical,720,85,200,1000";

/// A running test app plus the upload dir it spools CSV files into.
pub struct TestApp {
    pub server: TestServer,
    pub upload_dir: TempDir,
}

pub fn spawn_app(model: Option<Arc<dyn GenerativeModel>>) -> TestApp {
    let upload_dir = tempfile::tempdir().expect("Failed to create upload dir");
    let state = AppState::new(
        Arc::new(InMemoryRepository::new()),
        model,
        upload_dir.path().to_path_buf(),
        1024 * 1024,
    );
    let server = TestServer::new(build_app(state)).expect("Failed to start test server");
    TestApp { server, upload_dir }
}

pub fn spawn_app_with_mock(model: MockModel) -> (TestApp, Arc<MockModel>) {
    let model = Arc::new(model);
    let app = spawn_app(Some(model.clone() as Arc<dyn GenerativeModel>));
    (app, model)
}

pub fn sample_profile() -> Value {
    json!({
        "name": "Acme Corp",
        "industry": "Retail",
        "size": "51-250",
        "contactEmail": "cloud-team@acme.io"
    })
}

pub fn sample_instance() -> Value {
    json!({
        "name": "api-server-01",
        "provider": "aws",
        "region": "us-east-1",
        "type": "t3.medium",
        "cpu": 2,
        "memoryGb": 4,
        "storageGb": 50,
        "monthlyCost": 42,
        "environment": "prod",
        "status": "running",
        "cpuUtilization": 70,
        "memoryUtilization": 60,
        "networkInGb": 10,
        "networkOutGb": 15,
        "computeCost": 35,
        "storageCost": 5,
        "networkCost": 2,
        "tags": ["web-server", "prod"],
        "uptime": 720,
        "peakCpuUsage": 85,
        "avgResponseTime": 200,
        "requestsPerHour": 1000
    })
}

pub fn csv_form(contents: impl Into<String>) -> MultipartForm {
    let bytes = contents.into().into_bytes();
    MultipartForm::new().add_part(
        "file",
        Part::bytes(bytes).file_name("instances.csv").mime_type("text/csv"),
    )
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
