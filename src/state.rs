//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! LLM is optional: without it the chat route answers 503 and everything
//! else keeps working.

use std::sync::Arc;

use crate::llm::LlmChat;
use crate::services::knowledge::KnowledgeBase;

/// Clone is required by Axum; inner fields are Arc-wrapped or Copy.
#[derive(Clone)]
pub struct AppState {
    pub llm: Option<Arc<dyn LlmChat>>,
    pub knowledge: Arc<KnowledgeBase>,
    pub max_tokens: u32,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>, knowledge: KnowledgeBase, max_tokens: u32) -> Self {
        Self { llm, knowledge: Arc::new(knowledge), max_tokens }
    }
}
