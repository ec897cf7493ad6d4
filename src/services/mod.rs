//! Services — server-side logic behind the HTTP routes.
//!
//! - `knowledge`: the firm's document index and overview
//! - `bot`: question → grounded reply

pub mod bot;
pub mod knowledge;
