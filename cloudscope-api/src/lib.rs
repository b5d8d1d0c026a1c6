// Library entry point for tests and the binary

pub mod ai_proxy;
pub mod api_docs;
pub mod app;
pub mod config;
pub mod csv_import;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod store;
pub mod version;

// Re-export commonly used types
pub use app::AppState;
pub use error::{ApiError, ApiResult};
