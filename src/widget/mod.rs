//! Chat widget core — the part of the page that talks to the visitor.
//!
//! SYSTEM CONTEXT
//! ==============
//! The widget sends visitor messages to `/api/chat`, renders replies through
//! [`crate::format`], and interrupts the conversation with a lead prompt
//! according to a [`gate::GatePolicy`]. Rendering targets are left to the
//! host: the session exposes a transcript of typed entries.

pub mod backend;
pub mod context;
pub mod gate;
pub mod session;

pub use backend::{ChatBackend, HttpChatBackend, HttpLeadSubmitter, LeadSubmitter, MockLeadSubmitter};
pub use gate::{GatePolicy, GateState, LeadGate};
pub use session::{ChatSession, TranscriptEntry, WidgetConfig};
