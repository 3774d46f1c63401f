//! Background expiry of abandoned conversations.
//!
//! The store already refuses to serve expired state; the sweeper only
//! reclaims the memory of conversations nobody will resume.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::domain::foundation::Timestamp;
use crate::ports::StateStore;

/// Periodically removes expired conversation state.
pub struct SessionSweeper {
    store: Arc<dyn StateStore>,
    interval: Duration,
}

impl SessionSweeper {
    /// Sweeper over the given store, running every `interval`.
    pub fn new(store: Arc<dyn StateStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Runs one sweep now.
    pub async fn sweep_once(&self) -> usize {
        match self.store.sweep_expired(Timestamp::now()).await {
            Ok(removed) => {
                if removed > 0 {
                    info!(removed, "expired conversations swept");
                }
                removed
            }
            Err(err) => {
                warn!(error = %err, "sweep failed");
                0
            }
        }
    }

    /// Spawns the periodic sweep loop.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick fires immediately; skip it so a fresh
            // process does not sweep an empty store.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.sweep_once().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::state::InMemoryStateStore;
    use crate::domain::foundation::ConversationId;
    use crate::domain::intake::ConversationState;
    use crate::ports::StateStore;

    #[tokio::test]
    async fn sweep_once_reports_removed_count() {
        let store = Arc::new(InMemoryStateStore::new(3600));
        let mut stale = ConversationState::new(ConversationId::new("telegram", "1"));
        stale.last_activity = Timestamp::now().minus_minutes(61);
        store.create(stale).await.unwrap();
        store
            .create(ConversationState::new(ConversationId::new("telegram", "2")))
            .await
            .unwrap();

        let sweeper = SessionSweeper::new(store.clone(), Duration::from_secs(1800));
        assert_eq!(sweeper.sweep_once().await, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn spawned_loop_sweeps_on_schedule() {
        tokio::time::pause();
        let store = Arc::new(InMemoryStateStore::new(3600));
        let mut stale = ConversationState::new(ConversationId::new("telegram", "1"));
        stale.last_activity = Timestamp::now().minus_minutes(61);
        store.create(stale).await.unwrap();

        let handle = SessionSweeper::new(store.clone(), Duration::from_secs(60)).spawn();
        // Let the loop start and take its immediate first tick before
        // advancing the clock to the first real tick.
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert!(store.is_empty());
        handle.abort();
    }
}
