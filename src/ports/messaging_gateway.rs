//! Messaging Gateway Port - outbound message transport.
//!
//! Delivery and ordering guarantees belong to the platform adapter
//! behind this trait; the core only emits effects.

use async_trait::async_trait;

use crate::domain::foundation::ConversationId;

/// Errors from message delivery.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Message delivery failed: {0}")]
    DeliveryFailed(String),
}

/// Port for the messaging platform.
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Sends a plain text message.
    async fn send_text(&self, to: &ConversationId, text: &str) -> Result<(), GatewayError>;

    /// Sends a message with an enumerated option list.
    async fn send_choice_list(
        &self,
        to: &ConversationId,
        text: &str,
        options: &[String],
    ) -> Result<(), GatewayError>;

    /// Shows a typing indicator while slow work runs.
    async fn send_typing_indicator(&self, to: &ConversationId) -> Result<(), GatewayError>;
}
