//! Per-conversation workflow state.
//!
//! The state store holds one [`ConversationState`] per active
//! conversation. Step-specific data is a tagged union with one variant
//! per step, so handlers never probe an untyped attribute bag for keys
//! that may be missing.

use serde::{Deserialize, Serialize};

use super::{Cart, IdentifiedPatient, IntakeStep, PatientRecord, Sex};
use crate::domain::catalog::MatchCandidate;
use crate::domain::foundation::{ConversationId, Timestamp};
use chrono::NaiveDate;

/// Names the state machine owning a conversation.
///
/// Only one workflow may be active per conversation at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowName {
    #[default]
    QuoteIntake,
}

impl std::fmt::Display for WorkflowName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QuoteIntake => write!(f, "quote_intake"),
        }
    }
}

/// Step-scoped conversation data: one variant per workflow step,
/// carrying only what that step and the next need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "step")]
pub enum StepData {
    /// Waiting for the document id.
    AwaitingId,
    /// Several records matched the id; waiting for a numeric pick.
    SelectingPatient { candidates: Vec<PatientRecord> },
    /// Waiting for the surname check answer.
    AwaitingSurnameVerify { patient: PatientRecord },
    /// Waiting for the birth-month check answer.
    AwaitingBirthMonthVerify { patient: PatientRecord },
    /// Registration: waiting for the first name.
    AwaitingNewName { document_id: String },
    /// Registration: waiting for the surname.
    AwaitingNewSurname { document_id: String, first_name: String },
    /// Registration: waiting for the birth date.
    AwaitingNewBirthdate {
        document_id: String,
        first_name: String,
        last_name: String,
    },
    /// Registration: waiting for the sex.
    AwaitingNewSex {
        document_id: String,
        first_name: String,
        last_name: String,
        birth_date: NaiveDate,
    },
    /// Registration: waiting for the phone number.
    AwaitingNewPhone {
        document_id: String,
        first_name: String,
        last_name: String,
        birth_date: NaiveDate,
        sex: Sex,
    },
    /// Registration: waiting for the optional email.
    AwaitingNewEmail {
        document_id: String,
        first_name: String,
        last_name: String,
        birth_date: NaiveDate,
        sex: Sex,
        phone: String,
    },
    /// Waiting for study search terms.
    AwaitingTests { patient: IdentifiedPatient, cart: Cart },
    /// Waiting for a pick among ambiguous study candidates.
    SelectingStudies {
        patient: IdentifiedPatient,
        cart: Cart,
        candidates: Vec<MatchCandidate>,
    },
    /// Studies in the cart; further searches or a closing token expected.
    BuildingCart { patient: IdentifiedPatient, cart: Cart },
    /// Waiting for the final confirmation.
    Confirming { patient: IdentifiedPatient, cart: Cart },
}

impl StepData {
    /// The step this data belongs to.
    pub fn step(&self) -> IntakeStep {
        match self {
            Self::AwaitingId => IntakeStep::AwaitingId,
            Self::SelectingPatient { .. } => IntakeStep::SelectingPatient,
            Self::AwaitingSurnameVerify { .. } => IntakeStep::AwaitingSurnameVerify,
            Self::AwaitingBirthMonthVerify { .. } => IntakeStep::AwaitingBirthMonthVerify,
            Self::AwaitingNewName { .. } => IntakeStep::AwaitingNewName,
            Self::AwaitingNewSurname { .. } => IntakeStep::AwaitingNewSurname,
            Self::AwaitingNewBirthdate { .. } => IntakeStep::AwaitingNewBirthdate,
            Self::AwaitingNewSex { .. } => IntakeStep::AwaitingNewSex,
            Self::AwaitingNewPhone { .. } => IntakeStep::AwaitingNewPhone,
            Self::AwaitingNewEmail { .. } => IntakeStep::AwaitingNewEmail,
            Self::AwaitingTests { .. } => IntakeStep::AwaitingTests,
            Self::SelectingStudies { .. } => IntakeStep::SelectingStudies,
            Self::BuildingCart { .. } => IntakeStep::BuildingCart,
            Self::Confirming { .. } => IntakeStep::Confirming,
        }
    }
}

/// One conversation's ephemeral workflow state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Platform-qualified conversation key.
    pub conversation_id: ConversationId,
    /// Owning workflow.
    pub workflow: WorkflowName,
    /// Step-scoped data; the current step is implied by the variant.
    pub data: StepData,
    /// Failed verification answers so far. Shared across the surname
    /// and birth-month checks, by design.
    pub verify_attempts: u8,
    /// When the workflow started.
    pub created_at: Timestamp,
    /// Last inbound activity; drives the TTL sweep.
    pub last_activity: Timestamp,
}

impl ConversationState {
    /// Fresh state at the first step of the intake workflow.
    pub fn new(conversation_id: ConversationId) -> Self {
        let now = Timestamp::now();
        Self {
            conversation_id,
            workflow: WorkflowName::QuoteIntake,
            data: StepData::AwaitingId,
            verify_attempts: 0,
            created_at: now,
            last_activity: now,
        }
    }

    /// The current workflow step.
    pub fn step(&self) -> IntakeStep {
        self.data.step()
    }

    /// True when `last_activity` is older than the inactivity window.
    pub fn is_expired(&self, now: Timestamp, window_secs: u64) -> bool {
        now.duration_since(&self.last_activity).num_seconds() > window_secs as i64
    }

    /// Marks activity now.
    pub fn touch(&mut self) {
        self.last_activity = Timestamp::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ConversationState {
        ConversationState::new(ConversationId::new("telegram", "1"))
    }

    #[test]
    fn new_state_starts_at_awaiting_id() {
        let s = state();
        assert_eq!(s.step(), IntakeStep::AwaitingId);
        assert_eq!(s.verify_attempts, 0);
        assert_eq!(s.workflow, WorkflowName::QuoteIntake);
    }

    #[test]
    fn step_is_derived_from_data_variant() {
        let mut s = state();
        s.data = StepData::AwaitingNewName {
            document_id: "V-123456".to_string(),
        };
        assert_eq!(s.step(), IntakeStep::AwaitingNewName);
    }

    #[test]
    fn expiry_is_strictly_older_than_window() {
        let mut s = state();
        let now = Timestamp::now();

        s.last_activity = now.minus_minutes(61);
        assert!(s.is_expired(now, 3600));

        s.last_activity = now.minus_minutes(59);
        assert!(!s.is_expired(now, 3600));
    }

    #[test]
    fn touch_advances_last_activity() {
        let mut s = state();
        s.last_activity = Timestamp::now().minus_minutes(10);
        let stale = s.last_activity;
        s.touch();
        assert!(s.last_activity.is_after(&stale));
    }

    #[test]
    fn state_roundtrips_through_json() {
        let s = state();
        let json = serde_json::to_string(&s).unwrap();
        let back: ConversationState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
