//! State Store Port - ephemeral per-conversation workflow state.
//!
//! Holds and mutates workflow state keyed by conversation id and
//! reclaims inactive entries. The in-process adapter keeps a mutex-
//! guarded map; a multi-instance deployment can swap in an external
//! keyed store behind this trait without changing the workflow.

use async_trait::async_trait;

use crate::domain::foundation::{ConversationId, Timestamp};
use crate::domain::intake::{ConversationState, StepData};

/// Errors from state store operations.
#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    #[error("Failed to serialize state: {0}")]
    SerializationFailed(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),
}

/// Port for the conversation state store.
///
/// Mutating operations on a missing conversation are no-ops that
/// report absence rather than errors; the workflow decides what
/// absence means at each step.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Stores fresh state for a conversation, overwriting any prior
    /// state for the same id. Callers check existence first when an
    /// overwrite is unintended.
    async fn create(&self, state: ConversationState) -> Result<(), StateStoreError>;

    /// Returns the state for a conversation, touching `last_activity`.
    ///
    /// An entry past the inactivity window is expired: it is removed
    /// and reported as absent instead of being acted upon.
    async fn get(&self, id: &ConversationId) -> Result<Option<ConversationState>, StateStoreError>;

    /// True when live state exists, without touching `last_activity`.
    async fn exists(&self, id: &ConversationId) -> Result<bool, StateStoreError>;

    /// Replaces the step data of an existing conversation.
    ///
    /// Returns false when no state exists. Does not validate that the
    /// implied step is reachable; that responsibility belongs to the
    /// workflow.
    async fn update_data(
        &self,
        id: &ConversationId,
        data: StepData,
    ) -> Result<bool, StateStoreError>;

    /// Adds `delta` to the verification-attempt counter and returns
    /// the new value, or `None` when no state exists.
    async fn increment_attempts(
        &self,
        id: &ConversationId,
        delta: u8,
    ) -> Result<Option<u8>, StateStoreError>;

    /// Removes a conversation's state. Returns false when absent.
    async fn delete(&self, id: &ConversationId) -> Result<bool, StateStoreError>;

    /// Removes every state whose `last_activity` is older than the
    /// inactivity window, relative to `now`. Returns the removal count.
    async fn sweep_expired(&self, now: Timestamp) -> Result<usize, StateStoreError>;
}
