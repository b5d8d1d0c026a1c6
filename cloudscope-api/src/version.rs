// Version information module

use std::fs;

/// Service version from a VERSION file next to the working directory,
/// falling back to the crate version baked in at compile time.
pub fn get_service_version() -> String {
    for candidate in ["VERSION", "../VERSION"] {
        if let Ok(contents) = fs::read_to_string(candidate) {
            let v = contents.trim();
            if !v.is_empty() {
                return v.to_string();
            }
        }
    }
    env!("CARGO_PKG_VERSION").to_string()
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct VersionInfo {
    pub service_version: String,
    /// Server clock when the request was answered.
    pub server_time: String,
}

pub fn get_version_info() -> VersionInfo {
    VersionInfo {
        service_version: get_service_version(),
        server_time: chrono::Utc::now()
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string(),
    }
}
