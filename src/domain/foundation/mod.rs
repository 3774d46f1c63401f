//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the labquote domain.

mod errors;
mod ids;
mod price;
mod state_machine;
mod timestamp;

pub use errors::ValidationError;
pub use ids::{CatalogEntryId, ConversationId, PatientId, QuoteId};
pub use price::Price;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
