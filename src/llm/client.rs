use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while talking to the model provider.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{0}")]
    Api(String),

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("Upstream request timed out. Please retry.")]
    Timeout,

    #[error("{0}")]
    Network(String),
}

impl LlmError {
    /// Normalize a transport-level failure: anything that smells like a
    /// timeout becomes the standard retryable timeout message, everything
    /// else passes its message through unchanged.
    pub fn from_transport(error: reqwest::Error) -> Self {
        let message = error.to_string();
        let lower = message.to_lowercase();
        if error.is_timeout()
            || lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("hang")
        {
            LlmError::Timeout
        } else {
            LlmError::Network(message)
        }
    }
}

/// Trait seam for the model provider: one single-turn completion per call.
/// The route handler only ever sees this trait, so tests swap in mocks.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send the fixed system prompt plus the caller's request text, returning
    /// the raw completion string.
    async fn complete(&self, user_prompt: &str) -> Result<String, LlmError>;
}
