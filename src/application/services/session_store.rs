//! Process-wide registry of per-user conversation windows.
//!
//! Created once at startup and dropped at shutdown. Each user gets an
//! independent `tokio::sync::Mutex`, so the fetch, generate, persist and
//! update span for one user is serialized while different users proceed in
//! parallel. Without `max_sessions` the registry grows with the number of
//! distinct users seen by the process.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{ChatMessage, ConversationHistory, DEFAULT_HISTORY_CAPACITY, UserId};

/// Exclusive access to one user's history for the duration of a turn.
pub type SessionGuard = OwnedMutexGuard<ConversationHistory>;

pub struct SessionStore {
    sessions: Mutex<SessionMap>,
    history_capacity: usize,
    max_sessions: Option<usize>,
}

#[derive(Default)]
struct SessionMap {
    slots: HashMap<UserId, SessionSlot>,
    clock: u64,
}

struct SessionSlot {
    history: Arc<Mutex<ConversationHistory>>,
    last_used: u64,
}

impl SessionMap {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Drops the least recently used session nobody holds or waits on.
    fn evict_idle(&mut self) -> Option<UserId> {
        let victim = self
            .slots
            .iter()
            .filter(|(_, slot)| Arc::strong_count(&slot.history) == 1)
            .min_by_key(|(_, slot)| slot.last_used)
            .map(|(user_id, _)| *user_id)?;
        self.slots.remove(&victim);
        Some(victim)
    }
}

impl SessionStore {
    pub fn new(history_capacity: usize, max_sessions: Option<usize>) -> Self {
        Self {
            sessions: Mutex::new(SessionMap::default()),
            history_capacity,
            max_sessions: max_sessions.filter(|max| *max > 0),
        }
    }

    /// Snapshot of a user's history; empty when the user has none.
    pub async fn get(&self, user_id: UserId) -> ConversationHistory {
        let history = {
            let mut map = self.sessions.lock().await;
            let tick = map.tick();
            match map.slots.get_mut(&user_id) {
                Some(slot) => {
                    slot.last_used = tick;
                    Arc::clone(&slot.history)
                }
                None => return ConversationHistory::with_capacity(self.history_capacity),
            }
        };

        let snapshot = history.lock().await.clone();
        snapshot
    }

    /// Appends entries, trimming the oldest past the capacity.
    pub async fn append(&self, user_id: UserId, entries: Vec<ChatMessage>) {
        let history = self.slot(user_id).await;
        history.lock().await.append(entries);
    }

    /// Waits for exclusive access to a user's history, creating it on first use.
    pub async fn lock(&self, user_id: UserId) -> SessionGuard {
        self.slot(user_id).await.lock_owned().await
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.lock().await.slots.len()
    }

    pub fn history_capacity(&self) -> usize {
        self.history_capacity
    }

    async fn slot(&self, user_id: UserId) -> Arc<Mutex<ConversationHistory>> {
        let mut map = self.sessions.lock().await;
        let tick = map.tick();

        if let Some(slot) = map.slots.get_mut(&user_id) {
            slot.last_used = tick;
            return Arc::clone(&slot.history);
        }

        if let Some(max_sessions) = self.max_sessions {
            if map.slots.len() >= max_sessions {
                match map.evict_idle() {
                    Some(evicted) => {
                        tracing::debug!(user_id = %evicted, "Evicted least recently used session")
                    }
                    None => tracing::warn!(
                        max_sessions,
                        "All sessions busy, exceeding session limit"
                    ),
                }
            }
        }

        let history = Arc::new(Mutex::new(ConversationHistory::with_capacity(
            self.history_capacity,
        )));
        map.slots.insert(
            user_id,
            SessionSlot {
                history: Arc::clone(&history),
                last_used: tick,
            },
        );
        history
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY, None)
    }
}
