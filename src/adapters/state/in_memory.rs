//! In-memory conversation state store.
//!
//! The authoritative store for a single-process deployment: one
//! mutex-guarded map per process. Read-modify-write sequences across
//! one inbound message are not atomic; this holds only while a given
//! conversation id is never processed concurrently. A multi-instance
//! deployment must substitute an external keyed store behind the same
//! port.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::foundation::{ConversationId, Timestamp};
use crate::domain::intake::{ConversationState, StepData};
use crate::ports::{StateStore, StateStoreError};

/// Mutex-guarded map of conversation id to workflow state.
pub struct InMemoryStateStore {
    entries: RwLock<HashMap<ConversationId, ConversationState>>,
    /// Inactivity window in seconds; entries idle longer are expired.
    ttl_secs: u64,
}

impl InMemoryStateStore {
    /// Creates an empty store with the given inactivity window.
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl_secs,
        }
    }

    /// Number of live (possibly stale) entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    /// True when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_lock(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<ConversationId, ConversationState>>, StateStoreError>
    {
        self.entries
            .read()
            .map_err(|_| StateStoreError::BackendError("state lock poisoned".to_string()))
    }

    fn write_lock(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<ConversationId, ConversationState>>, StateStoreError>
    {
        self.entries
            .write()
            .map_err(|_| StateStoreError::BackendError("state lock poisoned".to_string()))
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn create(&self, state: ConversationState) -> Result<(), StateStoreError> {
        self.write_lock()?
            .insert(state.conversation_id.clone(), state);
        Ok(())
    }

    async fn get(&self, id: &ConversationId) -> Result<Option<ConversationState>, StateStoreError> {
        let mut entries = self.write_lock()?;
        let now = Timestamp::now();
        match entries.get_mut(id) {
            Some(state) if state.is_expired(now, self.ttl_secs) => {
                // Expired state must not be acted upon.
                entries.remove(id);
                debug!(conversation = %id, "expired state dropped on read");
                Ok(None)
            }
            Some(state) => {
                state.touch();
                Ok(Some(state.clone()))
            }
            None => Ok(None),
        }
    }

    async fn exists(&self, id: &ConversationId) -> Result<bool, StateStoreError> {
        let now = Timestamp::now();
        Ok(self
            .read_lock()?
            .get(id)
            .is_some_and(|state| !state.is_expired(now, self.ttl_secs)))
    }

    async fn update_data(
        &self,
        id: &ConversationId,
        data: StepData,
    ) -> Result<bool, StateStoreError> {
        let mut entries = self.write_lock()?;
        match entries.get_mut(id) {
            Some(state) => {
                state.data = data;
                state.touch();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn increment_attempts(
        &self,
        id: &ConversationId,
        delta: u8,
    ) -> Result<Option<u8>, StateStoreError> {
        let mut entries = self.write_lock()?;
        match entries.get_mut(id) {
            Some(state) => {
                state.verify_attempts = state.verify_attempts.saturating_add(delta);
                state.touch();
                Ok(Some(state.verify_attempts))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &ConversationId) -> Result<bool, StateStoreError> {
        Ok(self.write_lock()?.remove(id).is_some())
    }

    async fn sweep_expired(&self, now: Timestamp) -> Result<usize, StateStoreError> {
        let mut entries = self.write_lock()?;
        let before = entries.len();
        entries.retain(|_, state| !state.is_expired(now, self.ttl_secs));
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, "swept expired conversation state");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: u64 = 3600;

    fn conversation(n: u32) -> ConversationId {
        ConversationId::new("telegram", &n.to_string())
    }

    fn store_with(states: Vec<ConversationState>) -> InMemoryStateStore {
        let store = InMemoryStateStore::new(HOUR);
        {
            let mut entries = store.entries.write().unwrap();
            for state in states {
                entries.insert(state.conversation_id.clone(), state);
            }
        }
        store
    }

    #[tokio::test]
    async fn create_overwrites_prior_state() {
        let store = InMemoryStateStore::new(HOUR);
        let id = conversation(1);

        let mut first = ConversationState::new(id.clone());
        first.verify_attempts = 2;
        store.create(first).await.unwrap();
        store.create(ConversationState::new(id.clone())).await.unwrap();

        let state = store.get(&id).await.unwrap().unwrap();
        assert_eq!(state.verify_attempts, 0);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn get_touches_last_activity() {
        let id = conversation(1);
        let mut state = ConversationState::new(id.clone());
        state.last_activity = Timestamp::now().minus_minutes(30);
        let stale = state.last_activity;
        let store = store_with(vec![state]);

        let touched = store.get(&id).await.unwrap().unwrap();
        assert!(touched.last_activity.is_after(&stale));
    }

    #[tokio::test]
    async fn get_drops_expired_state() {
        let id = conversation(1);
        let mut state = ConversationState::new(id.clone());
        state.last_activity = Timestamp::now().minus_minutes(61);
        let store = store_with(vec![state]);

        assert!(store.get(&id).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn exists_does_not_touch() {
        let id = conversation(1);
        let mut state = ConversationState::new(id.clone());
        state.last_activity = Timestamp::now().minus_minutes(30);
        let stale = state.last_activity;
        let store = store_with(vec![state]);

        assert!(store.exists(&id).await.unwrap());
        let entries = store.entries.read().unwrap();
        assert_eq!(entries.get(&id).unwrap().last_activity, stale);
    }

    #[tokio::test]
    async fn update_data_on_missing_state_returns_false() {
        let store = InMemoryStateStore::new(HOUR);
        let updated = store
            .update_data(&conversation(9), StepData::AwaitingId)
            .await
            .unwrap();
        assert!(!updated);
    }

    #[tokio::test]
    async fn increment_attempts_accumulates() {
        let id = conversation(1);
        let store = store_with(vec![ConversationState::new(id.clone())]);

        assert_eq!(store.increment_attempts(&id, 1).await.unwrap(), Some(1));
        assert_eq!(store.increment_attempts(&id, 1).await.unwrap(), Some(2));
        assert_eq!(
            store.increment_attempts(&conversation(9), 1).await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let id = conversation(1);
        let store = store_with(vec![ConversationState::new(id.clone())]);

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
    }

    #[tokio::test]
    async fn sweep_removes_only_entries_past_the_window() {
        let now = Timestamp::now();
        let mut stale = ConversationState::new(conversation(1));
        stale.last_activity = now.minus_minutes(61);
        let mut fresh = ConversationState::new(conversation(2));
        fresh.last_activity = now.minus_minutes(59);
        let store = store_with(vec![stale, fresh]);

        let removed = store.sweep_expired(now).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.exists(&conversation(2)).await.unwrap());
        assert!(!store.exists(&conversation(1)).await.unwrap());
    }
}
