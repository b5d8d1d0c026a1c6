use async_trait::async_trait;
use std::time::Duration;

pub mod gemini;
pub mod mock;

pub use gemini::GeminiModel;
pub use mock::MockModel;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// No response within the configured bound.
    #[error("model request timed out after {0:?}")]
    Timeout(Duration),
    /// Connection, TLS, or body-read failure.
    #[error("model transport error: {0}")]
    Transport(String),
    /// The vendor answered with a non-success status.
    #[error("model API returned {status}: {message}")]
    Upstream { status: u16, message: String },
    /// The vendor answered 2xx but without any text candidate.
    #[error("model returned no text")]
    EmptyResponse,
}

/// Text-in/text-out seam to a generative model vendor.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Backend label reported to API callers (e.g. `"gemini"`).
    fn source(&self) -> &str;

    /// Send a single prompt and return the model's raw text answer.
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}
