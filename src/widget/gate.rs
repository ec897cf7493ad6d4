//! Lead gate — decides when the chat is interrupted by a contact prompt.
//!
//! DESIGN
//! ======
//! One state machine covers both observed policies:
//!
//! ```text
//!   Open ──(nth message)──▶ PromptPending{mandatory} ──submit──▶ Captured
//!     ▲                            │
//!     └────────skip (optional)─────┘
//! ```
//!
//! `GateFirst` starts in `PromptPending{mandatory: true}`; `Progressive`
//! starts `Open` and asks at the configured message counts. Transitions are
//! computed by the pure [`step`] function and committed by [`LeadGate::apply`],
//! so no combination of flags can contradict the state. `Captured` absorbs
//! every event.
//!
//! Whether a pending prompt is actually on screen is tracked separately
//! (`displayed`): the gate can decide on a prompt before the widget gets
//! around to rendering it.

/// When to interrupt the conversation with a lead prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    /// Chat is locked from the start until contact details are submitted.
    GateFirst,
    /// A skippable prompt after `prompt_at` messages; once skipped, a
    /// mandatory one when the count reaches `mandatory_at`.
    Progressive { prompt_at: u32, mandatory_at: u32 },
}

impl GatePolicy {
    #[must_use]
    pub fn progressive() -> Self {
        Self::Progressive { prompt_at: 2, mandatory_at: 4 }
    }

    fn initial_state(self) -> GateState {
        match self {
            Self::GateFirst => GateState::PromptPending { mandatory: true },
            Self::Progressive { .. } => GateState::Open,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Open,
    PromptPending { mandatory: bool },
    Captured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    /// The user submitted a chat message.
    MessageCounted,
    /// The user dismissed a skippable prompt.
    Skipped,
    /// Contact details were accepted.
    Submitted,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GateError {
    #[error("no lead prompt is pending")]
    NoPrompt,
    #[error("the lead prompt cannot be skipped")]
    NotSkippable,
    #[error("contact details were already captured")]
    AlreadyCaptured,
    #[error("chat input is locked until contact details are submitted")]
    InputLocked,
}

/// Counters that drive gate timing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateCounters {
    pub messages: u32,
    pub skips: u32,
}

/// Compute the next state for `event` without mutating anything.
///
/// # Errors
///
/// Returns a [`GateError`] when `event` is not valid in `state`.
pub fn step(
    policy: GatePolicy,
    state: GateState,
    counters: GateCounters,
    event: GateEvent,
) -> Result<(GateState, GateCounters), GateError> {
    match (state, event) {
        (GateState::Captured, GateEvent::MessageCounted) => {
            Ok((GateState::Captured, GateCounters { messages: counters.messages + 1, ..counters }))
        }
        (GateState::Captured, _) => Err(GateError::AlreadyCaptured),

        (GateState::PromptPending { mandatory: true }, GateEvent::MessageCounted) => Err(GateError::InputLocked),
        (GateState::PromptPending { mandatory: false }, GateEvent::MessageCounted) => {
            Ok((state, GateCounters { messages: counters.messages + 1, ..counters }))
        }
        (GateState::PromptPending { mandatory: true }, GateEvent::Skipped) => Err(GateError::NotSkippable),
        (GateState::PromptPending { mandatory: false }, GateEvent::Skipped) => {
            Ok((GateState::Open, GateCounters { skips: counters.skips + 1, ..counters }))
        }
        (GateState::PromptPending { .. }, GateEvent::Submitted) => Ok((GateState::Captured, counters)),

        (GateState::Open, GateEvent::MessageCounted) => {
            let counters = GateCounters { messages: counters.messages + 1, ..counters };
            Ok((evaluate(policy, counters), counters))
        }
        (GateState::Open, GateEvent::Skipped | GateEvent::Submitted) => Err(GateError::NoPrompt),
    }
}

/// Timing rule applied after a message is counted while the chat is open.
fn evaluate(policy: GatePolicy, counters: GateCounters) -> GateState {
    match policy {
        GatePolicy::GateFirst => GateState::Open,
        GatePolicy::Progressive { prompt_at, mandatory_at } => {
            if counters.skips == 0 && counters.messages == prompt_at {
                GateState::PromptPending { mandatory: false }
            } else if counters.skips > 0 && counters.messages == mandatory_at {
                GateState::PromptPending { mandatory: true }
            } else {
                GateState::Open
            }
        }
    }
}

// =============================================================================
// LEAD GATE
// =============================================================================

/// Session-owned gate: policy, current state, counters, display flag.
#[derive(Debug, Clone)]
pub struct LeadGate {
    policy: GatePolicy,
    state: GateState,
    counters: GateCounters,
    displayed: bool,
}

impl LeadGate {
    #[must_use]
    pub fn new(policy: GatePolicy) -> Self {
        Self { policy, state: policy.initial_state(), counters: GateCounters::default(), displayed: false }
    }

    /// Apply `event` and return the new state.
    ///
    /// # Errors
    ///
    /// Returns a [`GateError`] and leaves the gate untouched when `event`
    /// is not valid in the current state.
    pub fn apply(&mut self, event: GateEvent) -> Result<GateState, GateError> {
        let (state, counters) = step(self.policy, self.state, self.counters, event)?;
        if !matches!(state, GateState::PromptPending { .. }) {
            self.displayed = false;
        }
        self.state = state;
        self.counters = counters;
        Ok(state)
    }

    /// Record that the pending prompt is now on screen.
    ///
    /// Returns `false` if there is nothing to show or it is already shown,
    /// which keeps a second scheduled display from duplicating the prompt.
    pub fn mark_displayed(&mut self) -> bool {
        if matches!(self.state, GateState::PromptPending { .. }) && !self.displayed {
            self.displayed = true;
            return true;
        }
        false
    }

    #[must_use]
    pub fn state(&self) -> GateState {
        self.state
    }

    #[must_use]
    pub fn policy(&self) -> GatePolicy {
        self.policy
    }

    #[must_use]
    pub fn message_count(&self) -> u32 {
        self.counters.messages
    }

    #[must_use]
    pub fn skip_count(&self) -> u32 {
        self.counters.skips
    }

    /// A prompt is on screen and unresolved.
    #[must_use]
    pub fn prompt_shown(&self) -> bool {
        self.displayed
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.state == GateState::Captured
    }

    /// Whether the chat input accepts messages.
    #[must_use]
    pub fn input_enabled(&self) -> bool {
        self.state != GateState::PromptPending { mandatory: true }
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
