use anyhow::Result;
use cloudscope_providers::{GeminiModel, GenerativeModel};
use std::sync::Arc;

use super::Settings;

/// Create the recommendation model client, or `None` when no credential is configured.
pub fn create_model(settings: &Settings) -> Result<Option<Arc<dyn GenerativeModel>>> {
    let Some(cfg) = settings.gemini.clone() else {
        tracing::warn!("GEMINI_API_KEY not set; /api/ai/recommendations will answer 500");
        return Ok(None);
    };
    tracing::info!(model = %cfg.model, timeout_secs = cfg.timeout.as_secs(), "gemini model configured");
    let model = GeminiModel::new(cfg)?;
    Ok(Some(Arc::new(model)))
}
