use cloudscope_providers::GenerativeModel;
use std::path::PathBuf;
use std::sync::Arc;

use crate::store::CompanyRepository;

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn CompanyRepository>,
    /// `None` when no model credential is configured; only the AI endpoint depends on it.
    pub model: Option<Arc<dyn GenerativeModel>>,
    /// Where CSV uploads are spooled while they are parsed.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn CompanyRepository>,
        model: Option<Arc<dyn GenerativeModel>>,
        upload_dir: PathBuf,
        max_upload_bytes: usize,
    ) -> Arc<Self> {
        Arc::new(Self {
            repo,
            model,
            upload_dir,
            max_upload_bytes,
        })
    }
}
