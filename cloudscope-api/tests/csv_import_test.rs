// Integration tests for the CSV import endpoint

mod common;

use axum_test::multipart::MultipartForm;
use common::{csv_form, dir_is_empty, sample_instance, spawn_app, CSV_HEADER, CSV_ROW};
use serde_json::{json, Value};

#[tokio::test]
async fn test_import_valid_rows() {
    let app = spawn_app(None);
    let csv = format!("{CSV_HEADER}\n{CSV_ROW}\n{CSV_ROW}\n");

    let response = app.server.post("/api/company/import-csv").multipart(csv_form(csv)).await;
    assert_eq!(response.status_code(), 200);

    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["imported"], 2);
    assert_eq!(body["errors"], json!([]));
    assert_eq!(body["instances"].as_array().unwrap().len(), 2);
    assert_eq!(
        body["instances"][0]["tags"],
        json!(["web-server", "prod", "critical"])
    );
}

#[tokio::test]
async fn test_import_partitions_good_and_bad_rows() {
    let app = spawn_app(None);
    let negative_cpu = CSV_ROW.replacen(",2,4,", ",-2,4,", 1);
    let bad_env = CSV_ROW.replacen(",prod,running,", ",qa,running,", 1);
    let csv = format!("{CSV_HEADER}\n{CSV_ROW}\n{negative_cpu}\n{CSV_ROW}\n{bad_env}\n{CSV_ROW}\n");

    let body: Value = app
        .server
        .post("/api/company/import-csv")
        .multipart(csv_form(csv))
        .await
        .json();

    assert_eq!(body["imported"], 3);
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0]["row"], 2);
    assert_eq!(errors[0]["details"][0]["field"], "cpu");
    assert_eq!(errors[1]["row"], 4);
    assert_eq!(errors[1]["details"][0]["field"], "environment");
    assert!(errors[1]["reason"].as_str().unwrap().starts_with("Invalid instance"));
}

#[tokio::test]
async fn test_import_returns_full_inventory() {
    let app = spawn_app(None);
    app.server.post("/api/company/instance").json(&sample_instance()).await;

    let body: Value = app
        .server
        .post("/api/company/import-csv")
        .multipart(csv_form(format!("{CSV_HEADER}\n{CSV_ROW}\n")))
        .await
        .json();

    assert_eq!(body["imported"], 1);
    assert_eq!(body["instances"].as_array().unwrap().len(), 2);

    let listed: Value = app.server.get("/api/company/instances").await.json();
    assert_eq!(listed["instances"], body["instances"]);
}

#[tokio::test]
async fn test_header_mismatch_imports_nothing() {
    let app = spawn_app(None);
    let reordered = CSV_HEADER.replacen("cpu,memoryGb", "memoryGb,cpu", 1);
    let csv = format!("{reordered}\n{CSV_ROW}\n");

    let response = app.server.post("/api/company/import-csv").multipart(csv_form(csv)).await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid headers. Expected name,provider"));
    assert!(body["found"].is_array());

    let listed: Value = app.server.get("/api/company/instances").await.json();
    assert_eq!(listed["instances"], json!([]));
}

#[tokio::test]
async fn test_empty_file_is_rejected() {
    let app = spawn_app(None);
    let response = app.server.post("/api/company/import-csv").multipart(csv_form("")).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["error"], "CSV empty");
}

#[tokio::test]
async fn test_missing_file_field() {
    let app = spawn_app(None);
    let form = MultipartForm::new().add_text("note", "no file here");
    let response = app.server.post("/api/company/import-csv").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["error"], "File required");
}

#[tokio::test]
async fn test_non_multipart_request() {
    let app = spawn_app(None);
    let response = app
        .server
        .post("/api/company/import-csv")
        .json(&json!({"file": "nope"}))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["error"], "File required");
}

#[tokio::test]
async fn test_upload_dir_is_cleaned_up() {
    let app = spawn_app(None);

    let ok = app
        .server
        .post("/api/company/import-csv")
        .multipart(csv_form(format!("{CSV_HEADER}\n{CSV_ROW}\n")))
        .await;
    assert_eq!(ok.status_code(), 200);
    assert!(dir_is_empty(app.upload_dir.path()));

    let failed = app
        .server
        .post("/api/company/import-csv")
        .multipart(csv_form("not,the,right,header\n1,2,3,4\n"))
        .await;
    assert_eq!(failed.status_code(), 400);
    assert!(dir_is_empty(app.upload_dir.path()));
}

#[tokio::test]
async fn test_oversize_upload_is_rejected_and_cleaned_up() {
    let app = spawn_app(None);
    let limit = 1024 * 1024;
    let mut csv = format!("{CSV_HEADER}\n");
    while csv.len() <= limit {
        csv.push_str(CSV_ROW);
        csv.push('\n');
    }

    let response = app.server.post("/api/company/import-csv").multipart(csv_form(csv)).await;
    assert_eq!(response.status_code(), 413);
    assert_eq!(
        response.json::<Value>()["error"],
        format!("File too large (limit {limit} bytes)")
    );
    assert!(dir_is_empty(app.upload_dir.path()));

    let listed: Value = app.server.get("/api/company/instances").await.json();
    assert_eq!(listed["instances"], json!([]));
}
