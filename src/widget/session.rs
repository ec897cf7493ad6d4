//! Chat session — one per page view, owns everything the widget remembers.
//!
//! DESIGN
//! ======
//! `ChatSession` ties the lead gate, the context window and the transcript
//! together and performs the awaited calls to its collaborators. Every
//! operation that awaits takes `&mut self`, so only one user action can be in
//! flight at a time; that exclusive borrow is what keeps the send button
//! "disabled" while a reply or a lead submission is outstanding.
//!
//! The transcript is append-only apart from the lead prompt card, which is
//! removed once the prompt is resolved.

use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tracing::{info, warn};

use super::backend::{ChatBackend, LeadSubmitError, LeadSubmitter};
use super::context::ContextWindow;
use super::gate::{GateError, GateEvent, GatePolicy, GateState, LeadGate};
use crate::format::{format_message, render_user_text};
use crate::protocol::{ChatRequest, LeadRequest, Role};

pub const LOCKED_PLACEHOLDER: &str = "Please complete the form above...";
pub const OPEN_PLACEHOLDER: &str = "Type your question...";
pub const LEAD_CONFIRMATION: &str = "Thank you! How can I help you today?";
pub const LEAD_FAILURE_NOTICE: &str = "Error. Please try again.";

const SKIPPABLE_PROMPT: &str =
    "Would you like someone from our team to follow up? Leave your email and phone, or skip for now.";
const MANDATORY_PROMPT: &str = "To keep chatting, please share your email and phone so our team can follow up.";
const SUBMIT_LABEL: &str = "Send Details";
const SUBMITTING_LABEL: &str = "Sending...";

// =============================================================================
// CONFIG
// =============================================================================

/// Widget behaviour: gating policy, memory size and pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetConfig {
    pub policy: GatePolicy,
    /// Bound of the context window.
    pub context_limit: usize,
    /// Send the context window with each message.
    pub send_history: bool,
    /// Pause before a lead prompt appears.
    pub prompt_delay: Duration,
}

impl WidgetConfig {
    /// Chat locked until contact details are given on first open.
    #[must_use]
    pub fn gate_first() -> Self {
        Self {
            policy: GatePolicy::GateFirst,
            context_limit: 6,
            send_history: false,
            prompt_delay: Duration::from_millis(500),
        }
    }

    /// Open chat with a skippable prompt, then a mandatory one.
    #[must_use]
    pub fn progressive() -> Self {
        Self {
            policy: GatePolicy::progressive(),
            context_limit: 10,
            send_history: true,
            prompt_delay: Duration::from_millis(1000),
        }
    }

    #[must_use]
    pub fn with_prompt_delay(mut self, delay: Duration) -> Self {
        self.prompt_delay = delay;
        self
    }
}

// =============================================================================
// TRANSCRIPT
// =============================================================================

/// A rendered transcript message. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    /// Text as authored.
    pub text: String,
    /// Markup inserted into the transcript.
    pub html: String,
    pub timestamp: OffsetDateTime,
}

impl ChatMessage {
    fn new(role: Role, text: String) -> Self {
        let html = match role {
            Role::User => render_user_text(&text),
            Role::Bot => format_message(&text),
        };
        let timestamp = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self { role, text, html, timestamp }
    }

    /// `H:MM` wall-clock label.
    #[must_use]
    pub fn time_label(&self) -> String {
        format!("{}:{:02}", self.timestamp.hour(), self.timestamp.minute())
    }
}

/// The lead capture form as shown in the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadPromptCard {
    pub mandatory: bool,
    pub submitting: bool,
}

impl LeadPromptCard {
    #[must_use]
    pub fn skippable(&self) -> bool {
        !self.mandatory
    }

    #[must_use]
    pub fn text(&self) -> &'static str {
        if self.mandatory { MANDATORY_PROMPT } else { SKIPPABLE_PROMPT }
    }

    /// The same card while its submission is in flight.
    #[must_use]
    pub fn sending(self) -> Self {
        Self { submitting: true, ..self }
    }

    #[must_use]
    pub fn submit_label(&self) -> &'static str {
        if self.submitting { SUBMITTING_LABEL } else { SUBMIT_LABEL }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEntry {
    Message(ChatMessage),
    LeadPrompt(LeadPromptCard),
}

// =============================================================================
// ERRORS / OUTCOMES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("message is empty")]
    Empty,
    #[error(transparent)]
    Gate(#[from] GateError),
}

#[derive(Debug, thiserror::Error)]
pub enum LeadError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Gate(#[from] GateError),
    #[error(transparent)]
    Submission(#[from] LeadSubmitError),
}

impl LeadError {
    /// Notice surfaced to the user.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::MissingField(field) => format!("Please enter your {field}."),
            Self::Gate(e) => e.to_string(),
            Self::Submission(_) => LEAD_FAILURE_NOTICE.to_string(),
        }
    }
}

/// What a single `send` produced.
#[derive(Debug, Clone, PartialEq)]
pub struct SendOutcome {
    pub reply: ChatMessage,
    /// A lead prompt that appeared after the reply.
    pub prompt: Option<LeadPromptCard>,
}

// =============================================================================
// SESSION
// =============================================================================

pub struct ChatSession {
    config: WidgetConfig,
    gate: LeadGate,
    context: ContextWindow,
    transcript: Vec<TranscriptEntry>,
    backend: Arc<dyn ChatBackend>,
    leads: Arc<dyn LeadSubmitter>,
    panel_open: bool,
}

impl ChatSession {
    #[must_use]
    pub fn new(config: WidgetConfig, backend: Arc<dyn ChatBackend>, leads: Arc<dyn LeadSubmitter>) -> Self {
        Self {
            gate: LeadGate::new(config.policy),
            context: ContextWindow::new(config.context_limit),
            transcript: Vec::new(),
            config,
            backend,
            leads,
            panel_open: false,
        }
    }

    /// Open the chat panel. A pending prompt nobody has seen yet is shown
    /// after the configured delay; returns it if so.
    pub async fn open_panel(&mut self) -> Option<LeadPromptCard> {
        self.panel_open = true;
        if matches!(self.gate.state(), GateState::PromptPending { .. }) && !self.gate.prompt_shown() {
            tokio::time::sleep(self.config.prompt_delay).await;
            return self.show_prompt();
        }
        None
    }

    pub fn close_panel(&mut self) {
        self.panel_open = false;
    }

    /// Send a user message and append the bot's reply.
    ///
    /// Backend failures never surface as errors: they become a fallback bot
    /// message and the session carries on.
    ///
    /// # Errors
    ///
    /// Returns [`SendError::Empty`] for blank input and a gate error while
    /// a mandatory prompt locks the input.
    pub async fn send(&mut self, text: &str) -> Result<SendOutcome, SendError> {
        let message = text.trim();
        if message.is_empty() {
            return Err(SendError::Empty);
        }
        if !self.gate.input_enabled() {
            return Err(GateError::InputLocked.into());
        }

        let history = if self.config.send_history { self.context.snapshot() } else { Vec::new() };
        let before = self.gate.state();
        let after = self.gate.apply(GateEvent::MessageCounted)?;
        let prompt_scheduled = after != before && matches!(after, GateState::PromptPending { .. });
        self.push_message(Role::User, message.to_string());
        info!(count = self.gate.message_count(), history = history.len(), "chat: message sent");

        let request = ChatRequest { message: message.to_string(), history };
        let reply_text = match self.backend.send(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "chat: backend call failed");
                e.fallback_reply().to_string()
            }
        };
        let reply = self.push_message(Role::Bot, reply_text);

        let prompt = if prompt_scheduled {
            tokio::time::sleep(self.config.prompt_delay).await;
            self.show_prompt()
        } else {
            None
        };
        Ok(SendOutcome { reply, prompt })
    }

    /// Dismiss a skippable prompt.
    ///
    /// # Errors
    ///
    /// Returns a [`GateError`] if no prompt is pending or it is mandatory.
    pub fn skip_prompt(&mut self) -> Result<(), GateError> {
        self.gate.apply(GateEvent::Skipped)?;
        self.remove_prompt_card();
        info!(skips = self.gate.skip_count(), "lead: prompt skipped");
        Ok(())
    }

    /// Submit contact details from the visible prompt.
    ///
    /// On failure the prompt stays up with its submit button restored and
    /// the gate is unchanged; retrying is up to the user.
    ///
    /// # Errors
    ///
    /// Returns a [`LeadError`] for blank fields, a missing prompt, or a
    /// rejected submission.
    pub async fn submit_lead(&mut self, lead: LeadRequest) -> Result<ChatMessage, LeadError> {
        match self.gate.state() {
            GateState::Captured => return Err(GateError::AlreadyCaptured.into()),
            GateState::Open => return Err(GateError::NoPrompt.into()),
            GateState::PromptPending { .. } if !self.gate.prompt_shown() => return Err(GateError::NoPrompt.into()),
            GateState::PromptPending { .. } => {}
        }
        if let Some(field) = lead.missing_field() {
            return Err(LeadError::MissingField(field));
        }

        self.set_card_submitting(true);
        match self.leads.submit(&lead).await {
            Ok(()) => {
                self.gate.apply(GateEvent::Submitted)?;
                self.remove_prompt_card();
                info!(email_domain = email_domain(&lead.email), "lead: captured");
                Ok(self.push_message(Role::Bot, LEAD_CONFIRMATION.to_string()))
            }
            Err(e) => {
                self.set_card_submitting(false);
                warn!(error = %e, "lead: submission failed");
                Err(e.into())
            }
        }
    }

    #[must_use]
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    #[must_use]
    pub fn gate(&self) -> &LeadGate {
        &self.gate
    }

    #[must_use]
    pub fn context(&self) -> &ContextWindow {
        &self.context
    }

    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    #[must_use]
    pub fn is_panel_open(&self) -> bool {
        self.panel_open
    }

    #[must_use]
    pub fn input_enabled(&self) -> bool {
        self.gate.input_enabled()
    }

    #[must_use]
    pub fn input_placeholder(&self) -> &'static str {
        if self.input_enabled() { OPEN_PLACEHOLDER } else { LOCKED_PLACEHOLDER }
    }

    /// The prompt card currently in the transcript, if any.
    #[must_use]
    pub fn prompt_card(&self) -> Option<&LeadPromptCard> {
        self.transcript.iter().rev().find_map(|entry| match entry {
            TranscriptEntry::LeadPrompt(card) => Some(card),
            TranscriptEntry::Message(_) => None,
        })
    }

    fn show_prompt(&mut self) -> Option<LeadPromptCard> {
        let GateState::PromptPending { mandatory } = self.gate.state() else {
            return None;
        };
        if !self.gate.mark_displayed() {
            return None;
        }
        let card = LeadPromptCard { mandatory, submitting: false };
        self.transcript.push(TranscriptEntry::LeadPrompt(card));
        info!(mandatory, count = self.gate.message_count(), "lead: prompt shown");
        Some(card)
    }

    fn push_message(&mut self, role: Role, text: String) -> ChatMessage {
        self.context.push(role, text.clone());
        let message = ChatMessage::new(role, text);
        self.transcript.push(TranscriptEntry::Message(message.clone()));
        message
    }

    fn set_card_submitting(&mut self, submitting: bool) {
        for entry in &mut self.transcript {
            if let TranscriptEntry::LeadPrompt(card) = entry {
                card.submitting = submitting;
            }
        }
    }

    fn remove_prompt_card(&mut self) {
        self.transcript
            .retain(|entry| !matches!(entry, TranscriptEntry::LeadPrompt(_)));
    }
}

fn email_domain(email: &str) -> &str {
    email.rsplit_once('@').map_or("", |(_, domain)| domain)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
