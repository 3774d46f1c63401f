//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Platform-qualified identifier for one ongoing conversation.
///
/// The qualifier prefix keeps ids from different messaging platforms
/// from colliding in the shared state store (e.g. `telegram:8834421`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Creates a conversation id from a platform name and a chat id.
    pub fn new(platform: &str, chat_id: &str) -> Self {
        Self(format!("{}:{}", platform, chat_id))
    }

    /// Parses a conversation id that is already platform-qualified.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the value has no `platform:chat` shape.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.split_once(':') {
            Some((platform, chat)) if !platform.is_empty() && !chat.is_empty() => {
                Ok(Self(value.to_string()))
            }
            _ => Err(ValidationError::invalid_format(
                "conversation_id",
                "expected '<platform>:<chat_id>'",
            )),
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the chat-id portion, without the platform qualifier.
    pub fn chat_id(&self) -> &str {
        self.0
            .split_once(':')
            .map(|(_, chat)| chat)
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatientId(Uuid);

impl PatientId {
    /// Creates a new random PatientId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a PatientId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PatientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Unique identifier for a committed quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(Uuid);

impl QuoteId {
    /// Creates a new random QuoteId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a QuoteId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for QuoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for QuoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier of one priced catalog entry.
///
/// Carries the catalog document's own id verbatim; the catalog is an
/// external source of truth and its ids are opaque strings here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogEntryId(String);

impl CatalogEntryId {
    /// Wraps a raw catalog id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod conversation_id {
        use super::*;

        #[test]
        fn new_qualifies_with_platform() {
            let id = ConversationId::new("telegram", "8834421");
            assert_eq!(id.as_str(), "telegram:8834421");
        }

        #[test]
        fn chat_id_strips_qualifier() {
            let id = ConversationId::new("telegram", "8834421");
            assert_eq!(id.chat_id(), "8834421");
        }

        #[test]
        fn parse_accepts_qualified_value() {
            let id = ConversationId::parse("telegram:42").unwrap();
            assert_eq!(id.chat_id(), "42");
        }

        #[test]
        fn parse_rejects_unqualified_value() {
            assert!(ConversationId::parse("8834421").is_err());
        }

        #[test]
        fn parse_rejects_empty_chat() {
            assert!(ConversationId::parse("telegram:").is_err());
        }

        #[test]
        fn serializes_transparently() {
            let id = ConversationId::new("telegram", "7");
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, "\"telegram:7\"");
        }
    }

    mod patient_id {
        use super::*;

        #[test]
        fn new_ids_are_unique() {
            assert_ne!(PatientId::new(), PatientId::new());
        }

        #[test]
        fn roundtrips_through_display_and_from_str() {
            let id = PatientId::new();
            let parsed: PatientId = id.to_string().parse().unwrap();
            assert_eq!(id, parsed);
        }
    }

    mod catalog_entry_id {
        use super::*;

        #[test]
        fn preserves_raw_value() {
            let id = CatalogEntryId::new("LAB-0042");
            assert_eq!(id.as_str(), "LAB-0042");
        }
    }
}
