//! Collaborators the chat session talks to: the chat endpoint and the lead sink.
//!
//! Both are async traits so the session can be driven against mocks in tests
//! and against the HTTP server in the terminal widget.

use std::time::Duration;

use crate::protocol::{ChatReply, ChatRequest, LeadRequest, LeadResponse};

/// Simulated latency of the in-process lead sink.
pub const MOCK_LEAD_LATENCY: Duration = Duration::from_millis(600);

const NON_SUCCESS_REPLY: &str = "Sorry, something went wrong. Please try again.";
const UNREACHABLE_REPLY: &str = "Unable to connect to the server. Make sure the server is running.";

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The endpoint answered with a non-2xx status.
    #[error("chat endpoint returned status {0}")]
    Status(u16),
    /// The request never completed.
    #[error("chat endpoint unreachable: {0}")]
    Transport(String),
    /// A 2xx response whose body was not a chat reply.
    #[error("chat reply could not be parsed: {0}")]
    Parse(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl BackendError {
    /// Bot message shown in place of a reply.
    #[must_use]
    pub fn fallback_reply(&self) -> &'static str {
        match self {
            Self::Status(_) => NON_SUCCESS_REPLY,
            Self::Transport(_) | Self::Parse(_) | Self::HttpClientBuild(_) => UNREACHABLE_REPLY,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LeadSubmitError {
    #[error("lead rejected: {0}")]
    Rejected(String),
    #[error("lead submission failed: {0}")]
    Transport(String),
}

// =============================================================================
// TRAITS
// =============================================================================

/// Sends one chat message and returns the bot's raw reply text.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`BackendError`] for non-2xx responses, transport failures
    /// and unparseable bodies.
    async fn send(&self, request: &ChatRequest) -> Result<String, BackendError>;
}

/// Accepts captured contact details.
#[async_trait::async_trait]
pub trait LeadSubmitter: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`LeadSubmitError`] if the details were not accepted.
    async fn submit(&self, lead: &LeadRequest) -> Result<(), LeadSubmitError>;
}

// =============================================================================
// HTTP CHAT BACKEND
// =============================================================================

/// `POST {base_url}/api/chat` with a JSON body.
pub struct HttpChatBackend {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpChatBackend {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| BackendError::HttpClientBuild(e.to_string()))?;
        let endpoint = format!("{}/api/chat", base_url.trim_end_matches('/'));
        Ok(Self { http, endpoint })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, request: &ChatRequest) -> Result<String, BackendError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        let reply: ChatReply = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(reply.reply)
    }
}

// =============================================================================
// LEAD SUBMITTERS
// =============================================================================

/// In-process lead sink that accepts everything after a fixed delay.
#[derive(Debug, Clone)]
pub struct MockLeadSubmitter {
    latency: Duration,
}

impl MockLeadSubmitter {
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for MockLeadSubmitter {
    fn default() -> Self {
        Self::new(MOCK_LEAD_LATENCY)
    }
}

#[async_trait::async_trait]
impl LeadSubmitter for MockLeadSubmitter {
    async fn submit(&self, _lead: &LeadRequest) -> Result<(), LeadSubmitError> {
        tokio::time::sleep(self.latency).await;
        Ok(())
    }
}

/// `POST {base_url}/api/lead`.
pub struct HttpLeadSubmitter {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpLeadSubmitter {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self, LeadSubmitError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| LeadSubmitError::Transport(e.to_string()))?;
        let endpoint = format!("{}/api/lead", base_url.trim_end_matches('/'));
        Ok(Self { http, endpoint })
    }
}

#[async_trait::async_trait]
impl LeadSubmitter for HttpLeadSubmitter {
    async fn submit(&self, lead: &LeadRequest) -> Result<(), LeadSubmitError> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(lead)
            .send()
            .await
            .map_err(|e| LeadSubmitError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body: LeadResponse = response
            .json()
            .await
            .map_err(|e| LeadSubmitError::Transport(format!("status {status}: {e}")))?;
        if body.success {
            Ok(())
        } else {
            Err(LeadSubmitError::Rejected(body.error.unwrap_or_else(|| format!("status {status}"))))
        }
    }
}
