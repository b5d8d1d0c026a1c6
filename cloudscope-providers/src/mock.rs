use crate::{GenerativeModel, ModelError};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Timeout(Duration),
    Transport(String),
    Upstream(u16, String),
}

/// Canned model used by tests and offline runs. Records every prompt it receives.
#[derive(Debug)]
pub struct MockModel {
    reply: Reply,
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    fn with_reply(reply: Reply) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_reply(Reply::Text(text.into()))
    }

    pub fn timing_out(after: Duration) -> Self {
        Self::with_reply(Reply::Timeout(after))
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Transport(message.into()))
    }

    pub fn rejecting(status: u16, message: impl Into<String>) -> Self {
        Self::with_reply(Reply::Upstream(status, message.into()))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    fn source(&self) -> &str {
        "mock"
    }

    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        match &self.reply {
            Reply::Text(t) => Ok(t.clone()),
            Reply::Timeout(d) => Err(ModelError::Timeout(*d)),
            Reply::Transport(m) => Err(ModelError::Transport(m.clone())),
            Reply::Upstream(status, m) => Err(ModelError::Upstream {
                status: *status,
                message: m.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_prompts_and_replays_text() {
        let model = MockModel::replying("{}");
        assert_eq!(model.generate("hello").await.unwrap(), "{}");
        assert_eq!(model.prompts(), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn replays_configured_failure() {
        let model = MockModel::failing("connection refused");
        let err = model.generate("x").await.unwrap_err();
        assert!(matches!(err, ModelError::Transport(m) if m == "connection refused"));
    }
}
