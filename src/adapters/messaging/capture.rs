//! Capturing messaging gateway for tests.
//!
//! Records every outbound message for assertions instead of delivering
//! it. Testing only: lock poisoning panics.

use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::ConversationId;
use crate::ports::{GatewayError, MessagingGateway};

/// One captured outbound action.
#[derive(Debug, Clone, PartialEq)]
pub enum SentMessage {
    Text {
        to: ConversationId,
        text: String,
    },
    ChoiceList {
        to: ConversationId,
        text: String,
        options: Vec<String>,
    },
    Typing {
        to: ConversationId,
    },
}

/// Gateway double that captures instead of sending.
#[derive(Default)]
pub struct CapturingGateway {
    sent: RwLock<Vec<SentMessage>>,
}

impl CapturingGateway {
    /// Empty gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything captured so far, in send order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.read().expect("CapturingGateway: lock poisoned").clone()
    }

    /// Only the text payloads, typing indicators excluded.
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m {
                SentMessage::Text { text, .. } | SentMessage::ChoiceList { text, .. } => Some(text),
                SentMessage::Typing { .. } => None,
            })
            .collect()
    }

    /// The last text payload sent, if any.
    pub fn last_text(&self) -> Option<String> {
        self.texts().pop()
    }

    /// True when some captured text contains the fragment.
    pub fn sent_text_containing(&self, fragment: &str) -> bool {
        self.texts().iter().any(|t| t.contains(fragment))
    }

    /// Count of captured messages, typing included.
    pub fn message_count(&self) -> usize {
        self.sent.read().expect("CapturingGateway: lock poisoned").len()
    }

    /// Clears captures (for test isolation).
    pub fn clear(&self) {
        self.sent.write().expect("CapturingGateway: lock poisoned").clear();
    }

    fn push(&self, message: SentMessage) {
        self.sent
            .write()
            .expect("CapturingGateway: lock poisoned")
            .push(message);
    }
}

#[async_trait]
impl MessagingGateway for CapturingGateway {
    async fn send_text(&self, to: &ConversationId, text: &str) -> Result<(), GatewayError> {
        self.push(SentMessage::Text {
            to: to.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_choice_list(
        &self,
        to: &ConversationId,
        text: &str,
        options: &[String],
    ) -> Result<(), GatewayError> {
        self.push(SentMessage::ChoiceList {
            to: to.clone(),
            text: text.to_string(),
            options: options.to_vec(),
        });
        Ok(())
    }

    async fn send_typing_indicator(&self, to: &ConversationId) -> Result<(), GatewayError> {
        self.push(SentMessage::Typing { to: to.clone() });
        Ok(())
    }
}
