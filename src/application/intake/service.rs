//! Intake application service.
//!
//! The transport-facing entry point: receives inbound messages, runs
//! the workflow, and delivers the resulting effects through the
//! messaging gateway. A typing indicator is shown before handling
//! starts so the user sees activity while collaborators are called;
//! its failure is logged and ignored, since it is cosmetic.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::foundation::ConversationId;
use crate::domain::intake::{Effect, IntakeWorkflow, WorkflowError};
use crate::ports::{GatewayError, MessagingGateway};

/// Errors surfaced to the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Orchestrates the workflow and message delivery for one deployment.
pub struct IntakeService {
    workflow: Arc<IntakeWorkflow>,
    gateway: Arc<dyn MessagingGateway>,
}

impl IntakeService {
    /// Wires the service to the workflow and the outbound gateway.
    pub fn new(workflow: Arc<IntakeWorkflow>, gateway: Arc<dyn MessagingGateway>) -> Self {
        Self { workflow, gateway }
    }

    /// Starts (or restarts) the conversation and sends the greeting.
    pub async fn start(&self, id: &ConversationId) -> Result<(), ServiceError> {
        let effects = self.workflow.start(id).await?;
        self.deliver(id, &effects).await
    }

    /// Processes one inbound message end to end.
    pub async fn handle_inbound(&self, id: &ConversationId, text: &str) -> Result<(), ServiceError> {
        if let Err(err) = self.gateway.send_typing_indicator(id).await {
            debug!(conversation = %id, error = %err, "typing indicator failed");
        }
        let effects = self.workflow.handle_inbound(id, text).await?;
        self.deliver(id, &effects).await
    }

    /// True when the conversation has live intake state.
    pub async fn is_active(&self, id: &ConversationId) -> Result<bool, ServiceError> {
        Ok(self.workflow.is_active(id).await?)
    }

    /// Cancels the conversation and notifies the user.
    pub async fn cancel(&self, id: &ConversationId) -> Result<(), ServiceError> {
        let effects = self.workflow.cancel(id).await?;
        self.deliver(id, &effects).await
    }

    async fn deliver(&self, id: &ConversationId, effects: &[Effect]) -> Result<(), ServiceError> {
        for effect in effects {
            match effect {
                Effect::SendText { text } => self.gateway.send_text(id, text).await?,
                Effect::SendChoiceList { text, options } => {
                    self.gateway.send_choice_list(id, text, options).await?
                }
            }
        }
        if !effects.is_empty() {
            debug!(conversation = %id, count = effects.len(), "effects delivered");
        } else {
            warn!(conversation = %id, "inbound message produced no effects");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::{CachedCatalogProvider, InMemoryCatalogSource};
    use crate::adapters::directory::{sample_record, InMemoryPatientDirectory};
    use crate::adapters::messaging::{CapturingGateway, SentMessage};
    use crate::adapters::quotes::InMemoryQuoteStore;
    use crate::adapters::state::InMemoryStateStore;
    use crate::domain::catalog::{AliasTable, CatalogEntry};
    use crate::domain::foundation::{CatalogEntryId, Price};
    use crate::domain::intake::IntakeSettings;
    use std::time::Duration;

    fn service() -> (IntakeService, Arc<CapturingGateway>, ConversationId) {
        let store = Arc::new(InMemoryStateStore::new(3600));
        let directory = Arc::new(InMemoryPatientDirectory::with_records(vec![
            sample_record("V-17371453", "María", "Gutiérrez", (1985, 2, 14)),
            sample_record("E-17371453", "Mario", "Gutiérrez", (1960, 7, 1)),
        ]));
        let quotes = Arc::new(InMemoryQuoteStore::new());
        let source = Arc::new(InMemoryCatalogSource::new(vec![CatalogEntry::new(
            CatalogEntryId::new("HEM-01"),
            "Hemograma Completo",
            "HEM-01",
            Price::from_cents(1500),
        )]));
        let catalog = Arc::new(CachedCatalogProvider::new(source, Duration::from_secs(300)));
        let workflow = Arc::new(IntakeWorkflow::new(
            store,
            directory,
            quotes,
            catalog,
            Arc::new(AliasTable::empty()),
            IntakeSettings::default(),
        ));
        let gateway = Arc::new(CapturingGateway::new());
        (
            IntakeService::new(workflow, gateway.clone()),
            gateway,
            ConversationId::new("telegram", "7"),
        )
    }

    #[tokio::test]
    async fn start_delivers_greeting() {
        let (service, gateway, id) = service();
        service.start(&id).await.unwrap();
        assert!(gateway.sent_text_containing("cédula"));
    }

    #[tokio::test]
    async fn inbound_shows_typing_before_the_reply() {
        let (service, gateway, id) = service();
        service.start(&id).await.unwrap();
        gateway.clear();

        service.handle_inbound(&id, "V-17371453").await.unwrap();

        let sent = gateway.sent();
        assert!(matches!(sent[0], SentMessage::Typing { .. }));
        assert!(!matches!(sent[1], SentMessage::Typing { .. }));
    }

    #[tokio::test]
    async fn choice_effects_become_choice_list_sends() {
        let (service, gateway, id) = service();
        service.start(&id).await.unwrap();
        gateway.clear();

        // Two records share these digits, so the workflow answers with
        // a candidate list.
        service.handle_inbound(&id, "17371453").await.unwrap();

        let sent = gateway.sent();
        assert!(sent
            .iter()
            .any(|m| matches!(m, SentMessage::ChoiceList { options, .. } if options.len() == 2)));
    }

    #[tokio::test]
    async fn cancel_notifies_only_active_conversations() {
        let (service, gateway, id) = service();
        service.cancel(&id).await.unwrap();
        assert_eq!(gateway.message_count(), 0);

        service.start(&id).await.unwrap();
        service.cancel(&id).await.unwrap();
        assert!(gateway.sent_text_containing("cancelada"));
        assert!(!service.is_active(&id).await.unwrap());
    }
}
