//! The intake workflow's step enum and transition graph.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// One step of the quote-intake conversation.
///
/// The flow forks after identification: unknown ids enter the
/// new-patient registration chain, known ids enter the two-check
/// verification chain. Both rejoin at `AwaitingTests`.
/// `Completed` and `Cancelled` are terminal; the state store never
/// holds them (reaching either deletes the conversation state).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntakeStep {
    /// Waiting for the patient's document id.
    #[default]
    AwaitingId,
    /// Ambiguous id; waiting for a numeric pick from the candidate list.
    SelectingPatient,
    /// First secret-knowledge check: surname.
    AwaitingSurnameVerify,
    /// Second secret-knowledge check: birth month.
    AwaitingBirthMonthVerify,
    /// New-patient registration: first name.
    AwaitingNewName,
    /// New-patient registration: surname.
    AwaitingNewSurname,
    /// New-patient registration: birth date (DD/MM/YYYY).
    AwaitingNewBirthdate,
    /// New-patient registration: sex.
    AwaitingNewSex,
    /// New-patient registration: phone number.
    AwaitingNewPhone,
    /// New-patient registration: optional email; creates the record.
    AwaitingNewEmail,
    /// Waiting for free-text study search terms.
    AwaitingTests,
    /// Ambiguous search; waiting for a pick from the candidate studies.
    SelectingStudies,
    /// Studies in the cart; more searches or a closing token expected.
    BuildingCart,
    /// Cart summarized; waiting for the final yes/no.
    Confirming,
    /// Quote committed.
    Completed,
    /// Cancelled by the user, by lockout, or by a collaborator failure.
    Cancelled,
}

impl IntakeStep {
    /// True for the registration chain of a first-time patient.
    pub fn is_registration(&self) -> bool {
        matches!(
            self,
            Self::AwaitingNewName
                | Self::AwaitingNewSurname
                | Self::AwaitingNewBirthdate
                | Self::AwaitingNewSex
                | Self::AwaitingNewPhone
                | Self::AwaitingNewEmail
        )
    }

    /// True for the identity-verification chain of a known patient.
    pub fn is_verification(&self) -> bool {
        matches!(self, Self::AwaitingSurnameVerify | Self::AwaitingBirthMonthVerify)
    }
}

impl StateMachine for IntakeStep {
    fn can_transition_to(&self, target: &Self) -> bool {
        // Explicit cancellation is reachable from every live step.
        if *target == Self::Cancelled && !self.is_terminal() {
            return true;
        }
        use IntakeStep::*;
        matches!(
            (self, target),
            (AwaitingId, SelectingPatient)
                | (AwaitingId, AwaitingSurnameVerify)
                | (AwaitingId, AwaitingNewName)
                | (SelectingPatient, AwaitingSurnameVerify)
                | (AwaitingSurnameVerify, AwaitingBirthMonthVerify)
                | (AwaitingBirthMonthVerify, AwaitingTests)
                | (AwaitingNewName, AwaitingNewSurname)
                | (AwaitingNewSurname, AwaitingNewBirthdate)
                | (AwaitingNewBirthdate, AwaitingNewSex)
                | (AwaitingNewSex, AwaitingNewPhone)
                | (AwaitingNewPhone, AwaitingNewEmail)
                | (AwaitingNewEmail, AwaitingTests)
                | (AwaitingTests, SelectingStudies)
                | (AwaitingTests, BuildingCart)
                | (SelectingStudies, BuildingCart)
                | (BuildingCart, SelectingStudies)
                | (BuildingCart, AwaitingTests)
                | (BuildingCart, Confirming)
                | (Confirming, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use IntakeStep::*;
        let mut targets = match self {
            AwaitingId => vec![SelectingPatient, AwaitingSurnameVerify, AwaitingNewName],
            SelectingPatient => vec![AwaitingSurnameVerify],
            AwaitingSurnameVerify => vec![AwaitingBirthMonthVerify],
            AwaitingBirthMonthVerify => vec![AwaitingTests],
            AwaitingNewName => vec![AwaitingNewSurname],
            AwaitingNewSurname => vec![AwaitingNewBirthdate],
            AwaitingNewBirthdate => vec![AwaitingNewSex],
            AwaitingNewSex => vec![AwaitingNewPhone],
            AwaitingNewPhone => vec![AwaitingNewEmail],
            AwaitingNewEmail => vec![AwaitingTests],
            AwaitingTests => vec![SelectingStudies, BuildingCart],
            SelectingStudies => vec![BuildingCart],
            BuildingCart => vec![SelectingStudies, AwaitingTests, Confirming],
            Confirming => vec![Completed],
            Completed | Cancelled => vec![],
        };
        if !matches!(self, Completed | Cancelled) {
            targets.push(Cancelled);
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STEPS: [IntakeStep; 16] = [
        IntakeStep::AwaitingId,
        IntakeStep::SelectingPatient,
        IntakeStep::AwaitingSurnameVerify,
        IntakeStep::AwaitingBirthMonthVerify,
        IntakeStep::AwaitingNewName,
        IntakeStep::AwaitingNewSurname,
        IntakeStep::AwaitingNewBirthdate,
        IntakeStep::AwaitingNewSex,
        IntakeStep::AwaitingNewPhone,
        IntakeStep::AwaitingNewEmail,
        IntakeStep::AwaitingTests,
        IntakeStep::SelectingStudies,
        IntakeStep::BuildingCart,
        IntakeStep::Confirming,
        IntakeStep::Completed,
        IntakeStep::Cancelled,
    ];

    #[test]
    fn default_step_is_awaiting_id() {
        assert_eq!(IntakeStep::default(), IntakeStep::AwaitingId);
    }

    #[test]
    fn serializes_to_snake_case() {
        let json = serde_json::to_string(&IntakeStep::AwaitingBirthMonthVerify).unwrap();
        assert_eq!(json, "\"awaiting_birth_month_verify\"");
    }

    #[test]
    fn identification_forks_three_ways() {
        let step = IntakeStep::AwaitingId;
        assert!(step.can_transition_to(&IntakeStep::SelectingPatient));
        assert!(step.can_transition_to(&IntakeStep::AwaitingSurnameVerify));
        assert!(step.can_transition_to(&IntakeStep::AwaitingNewName));
        assert!(!step.can_transition_to(&IntakeStep::AwaitingTests));
    }

    #[test]
    fn both_branches_rejoin_at_awaiting_tests() {
        assert!(IntakeStep::AwaitingBirthMonthVerify.can_transition_to(&IntakeStep::AwaitingTests));
        assert!(IntakeStep::AwaitingNewEmail.can_transition_to(&IntakeStep::AwaitingTests));
    }

    #[test]
    fn building_cart_can_reject_empty_cart_back_to_search() {
        assert!(IntakeStep::BuildingCart.can_transition_to(&IntakeStep::AwaitingTests));
    }

    #[test]
    fn every_live_step_can_cancel() {
        for step in ALL_STEPS {
            if !matches!(step, IntakeStep::Completed | IntakeStep::Cancelled) {
                assert!(
                    step.can_transition_to(&IntakeStep::Cancelled),
                    "{:?} should be cancellable",
                    step
                );
            }
        }
    }

    #[test]
    fn terminal_steps_have_no_transitions() {
        assert!(IntakeStep::Completed.is_terminal());
        assert!(IntakeStep::Cancelled.is_terminal());
        assert!(!IntakeStep::Confirming.is_terminal());
    }

    #[test]
    fn valid_transitions_matches_can_transition_to() {
        for step in ALL_STEPS {
            for target in step.valid_transitions() {
                assert!(
                    step.can_transition_to(&target),
                    "inconsistent graph for {:?} -> {:?}",
                    step,
                    target
                );
            }
        }
    }

    #[test]
    fn verification_cannot_skip_the_second_check() {
        assert!(!IntakeStep::AwaitingSurnameVerify.can_transition_to(&IntakeStep::AwaitingTests));
    }
}
