//! Console messaging gateway for the local demo binary.

use async_trait::async_trait;

use crate::domain::foundation::ConversationId;
use crate::ports::{GatewayError, MessagingGateway};

/// Prints outbound messages to stdout.
#[derive(Debug, Default)]
pub struct ConsoleGateway;

impl ConsoleGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessagingGateway for ConsoleGateway {
    async fn send_text(&self, _to: &ConversationId, text: &str) -> Result<(), GatewayError> {
        println!("{}\n", text);
        Ok(())
    }

    async fn send_choice_list(
        &self,
        _to: &ConversationId,
        text: &str,
        options: &[String],
    ) -> Result<(), GatewayError> {
        println!("{}", text);
        for option in options {
            println!("  {}", option);
        }
        println!();
        Ok(())
    }

    async fn send_typing_indicator(&self, _to: &ConversationId) -> Result<(), GatewayError> {
        // No visual equivalent on a terminal.
        Ok(())
    }
}
