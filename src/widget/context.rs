//! Sliding window of recent transcript entries used as conversational memory.

use std::collections::VecDeque;

use crate::protocol::{HistoryEntry, Role};

/// Bounded FIFO of the most recent messages. Oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct ContextWindow {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl ContextWindow {
    /// A window holding at most `limit` entries. A zero limit keeps nothing.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self { entries: VecDeque::with_capacity(limit), limit }
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        if self.limit == 0 {
            return;
        }
        while self.entries.len() >= self.limit {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry { role, content: content.into() });
    }

    /// Copy of the window, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}
