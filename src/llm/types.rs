//! LLM types — provider-neutral messages, responses and errors.

use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Everything that can go wrong between the answerer and the model.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// An `LLM_*` variable held a value of the wrong type.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// No key under the configured variable name.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The provider response body could not be deserialized.
    #[error("API response parse failed: {0}")]
    ApiParse(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl LlmError {
    /// Whether retrying the same request could succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::ApiRequest(_) | Self::ApiResponse { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// MESSAGES
// =============================================================================

/// A single conversation message in provider terms (`user` / `assistant`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".into(), content: content.into() }
    }
}

/// One completion plus the usage numbers worth logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
    pub model: String,
    pub finish_reason: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

// =============================================================================
// LLM CHAT TRAIT
// =============================================================================

/// The one call the answerer makes. Routes and services take `dyn LlmChat`
/// so tests can script replies.
#[async_trait::async_trait]
pub trait LlmChat: Send + Sync {
    /// Send `messages` under the `system` prompt.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] if the request fails or the response is malformed.
    async fn chat(&self, max_tokens: u32, system: &str, messages: &[Message]) -> Result<ChatResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_rate_limits_are_retryable() {
        assert!(LlmError::ApiResponse { status: 429, body: String::new() }.retryable());
        assert!(LlmError::ApiResponse { status: 503, body: String::new() }.retryable());
        assert!(LlmError::ApiRequest("reset".into()).retryable());
    }

    #[test]
    fn client_errors_are_not_retryable() {
        assert!(!LlmError::ApiResponse { status: 400, body: String::new() }.retryable());
        assert!(!LlmError::ApiParse("bad json".into()).retryable());
        assert!(!LlmError::MissingApiKey { var: "X".into() }.retryable());
    }

    #[test]
    fn message_constructors_set_roles() {
        assert_eq!(Message::user("hi").role, "user");
        assert_eq!(Message::assistant("hello").role, "assistant");
    }
}
