//! LLM — the model behind the firm's chat assistant.
//!
//! DESIGN
//! ======
//! A single OpenAI-compatible chat-completions client, configured from the
//! environment. Callers depend on the [`LlmChat`] trait so the answerer can
//! be exercised against a mock.

pub mod config;
pub mod openai;
pub mod types;

use config::LlmConfig;
pub use openai::OpenAiClient;
pub use types::{ChatResponse, LlmChat, LlmError, Message};

/// Build a client from environment variables.
///
/// # Errors
///
/// Returns an error if the API key is missing or the HTTP client fails.
pub fn client_from_env() -> Result<OpenAiClient, LlmError> {
    OpenAiClient::new(LlmConfig::from_env()?)
}
