//! Outbound effects produced by the workflow.
//!
//! Step handlers never talk to the transport; they return an ordered
//! list of effects and the application layer performs delivery through
//! the messaging gateway. This keeps the workflow core testable with
//! no live connection.

use serde::{Deserialize, Serialize};

/// One outbound message for the conversation's chat.
///
/// The typing indicator is not an effect: the application layer shows
/// it before handling starts, while effects are delivered after.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Effect {
    /// Plain text message.
    SendText { text: String },
    /// Message with an enumerated list of options to pick from.
    SendChoiceList { text: String, options: Vec<String> },
}

impl Effect {
    /// Text message effect.
    pub fn text(text: impl Into<String>) -> Self {
        Self::SendText { text: text.into() }
    }

    /// Choice list effect.
    pub fn choices(text: impl Into<String>, options: Vec<String>) -> Self {
        Self::SendChoiceList {
            text: text.into(),
            options,
        }
    }
}
