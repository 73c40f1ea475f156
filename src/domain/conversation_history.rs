use std::collections::VecDeque;

use super::ChatMessage;

/// Entries kept per user: five user/assistant exchanges.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// Bounded rolling context window for one user.
///
/// Entries are kept oldest first. Appending past the capacity evicts from the
/// front, so `len() <= capacity()` holds after every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    entries: VecDeque<ChatMessage>,
    capacity: usize,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = ChatMessage>,
    {
        self.entries.extend(entries);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Appends one user/assistant pair.
    pub fn push_exchange(&mut self, user_text: impl Into<String>, reply: impl Into<String>) {
        self.append([ChatMessage::user(user_text), ChatMessage::assistant(reply)]);
    }

    pub fn messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<ChatMessage> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ConversationHistory {
    fn default() -> Self {
        Self::new()
    }
}
