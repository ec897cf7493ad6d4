//! Leadchat — a law firm website's chat assistant and its lead-capture widget.
//!
//! SYSTEM CONTEXT
//! ==============
//! The server half answers visitor questions from a folder of firm documents
//! (`services`, `routes`). The widget half (`widget`, `format`) is the
//! client: it talks to `/api/chat`, renders replies, and asks visitors for
//! contact details according to a gate policy.

pub mod config;
pub mod format;
pub mod llm;
pub mod protocol;
pub mod routes;
pub mod services;
pub mod state;
pub mod widget;
