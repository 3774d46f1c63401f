//! Intake module - the multi-turn quote-request conversation.
//!
//! A step-indexed state machine drives one conversation from patient
//! identification through study search to quote confirmation. Step
//! handlers are synchronous-per-event: each inbound message produces a
//! list of outbound [`Effect`]s the transport layer delivers.

mod cart;
mod effect;
pub mod messages;
mod patient;
mod state;
mod step;
mod tokens;
mod workflow;

pub use cart::Cart;
pub use effect::Effect;
pub use patient::{IdentifiedPatient, NewPatient, PatientRecord, Sex};
pub use state::{ConversationState, StepData, WorkflowName};
pub use step::IntakeStep;
pub use workflow::{IntakeSettings, IntakeWorkflow, WorkflowError};
