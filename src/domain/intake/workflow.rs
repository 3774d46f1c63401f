//! The quote-intake workflow: step handlers and transition logic.
//!
//! Each inbound message is processed to completion against the stored
//! conversation state: interpret the text for the current step, call
//! collaborators where the step demands it, persist the next step's
//! data, and return the outbound effects. Collaborator failures never
//! strand the user: the state is deleted and a fixed hand-off message
//! with the lab's contact details is returned.

use std::sync::Arc;

use chrono::Datelike;
use tracing::{debug, info, warn};

use super::state::{ConversationState, StepData};
use super::step::IntakeStep;
use super::{messages, tokens, Cart, Effect, IdentifiedPatient, NewPatient, PatientRecord, Sex};
use crate::domain::catalog::{AliasTable, CatalogMatcher, MatchCandidate};
use crate::domain::foundation::{ConversationId, StateMachine, ValidationError};
use crate::ports::{
    CatalogProvider, PatientDirectory, QuoteLineItem, QuoteStore, StateStore, StateStoreError,
};
use chrono::NaiveDate;

/// Tunables of the intake protocol.
#[derive(Debug, Clone)]
pub struct IntakeSettings {
    /// Failed verification answers allowed before lockout.
    pub max_verify_attempts: u8,
    /// Minimum match confidence for a study to qualify.
    pub match_threshold: f32,
    /// Low-confidence suggestions shown when nothing qualifies.
    pub max_suggestions: usize,
    /// Candidates offered for disambiguation (selection range).
    pub max_study_options: usize,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            max_verify_attempts: 3,
            match_threshold: 70.0,
            max_suggestions: 5,
            max_study_options: 10,
        }
    }
}

/// Errors surfaced to the caller of the workflow entry points.
///
/// User-input problems never appear here; they are handled with
/// re-prompt effects. These errors mean the infrastructure around the
/// workflow is broken.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("State store error: {0}")]
    Store(#[from] StateStoreError),

    #[error("Illegal step transition: {0}")]
    InvalidTransition(#[from] ValidationError),
}

/// The intake workflow state machine.
///
/// Explicitly constructed with its collaborators; holds no global
/// state, so tests instantiate isolated workflows per case.
pub struct IntakeWorkflow {
    store: Arc<dyn StateStore>,
    directory: Arc<dyn PatientDirectory>,
    quotes: Arc<dyn QuoteStore>,
    catalog: Arc<dyn CatalogProvider>,
    aliases: Arc<AliasTable>,
    matcher: CatalogMatcher,
    settings: IntakeSettings,
}

impl IntakeWorkflow {
    /// Wires the workflow to its collaborators.
    pub fn new(
        store: Arc<dyn StateStore>,
        directory: Arc<dyn PatientDirectory>,
        quotes: Arc<dyn QuoteStore>,
        catalog: Arc<dyn CatalogProvider>,
        aliases: Arc<AliasTable>,
        settings: IntakeSettings,
    ) -> Self {
        Self {
            store,
            directory,
            quotes,
            catalog,
            aliases,
            matcher: CatalogMatcher::new(),
            settings,
        }
    }

    /// Starts (or restarts) the intake conversation.
    ///
    /// Overwrites any prior state for the conversation.
    pub async fn start(&self, id: &ConversationId) -> Result<Vec<Effect>, WorkflowError> {
        self.store.create(ConversationState::new(id.clone())).await?;
        info!(conversation = %id, "intake workflow started");
        Ok(vec![Effect::text(messages::greeting())])
    }

    /// True when the conversation has live intake state.
    pub async fn is_active(&self, id: &ConversationId) -> Result<bool, WorkflowError> {
        Ok(self.store.exists(id).await?)
    }

    /// Cancels the conversation on behalf of the routing layer.
    pub async fn cancel(&self, id: &ConversationId) -> Result<Vec<Effect>, WorkflowError> {
        if self.store.delete(id).await? {
            info!(conversation = %id, "intake workflow cancelled");
            Ok(vec![Effect::text(messages::cancelled())])
        } else {
            Ok(Vec::new())
        }
    }

    /// Handles one inbound message for an active conversation.
    ///
    /// Returns no effects when the conversation has no live state
    /// (expired or never started); the routing layer owns that case.
    pub async fn handle_inbound(
        &self,
        id: &ConversationId,
        text: &str,
    ) -> Result<Vec<Effect>, WorkflowError> {
        let Some(state) = self.store.get(id).await? else {
            debug!(conversation = %id, "inbound message without live state");
            return Ok(Vec::new());
        };

        if tokens::is_cancel(text) {
            self.store.delete(id).await?;
            info!(conversation = %id, step = ?state.step(), "cancelled by user");
            return Ok(vec![Effect::text(messages::cancelled())]);
        }

        match state.data.clone() {
            StepData::AwaitingId => self.on_awaiting_id(id, text).await,
            StepData::SelectingPatient { candidates } => {
                self.on_selecting_patient(id, text, candidates).await
            }
            StepData::AwaitingSurnameVerify { patient } => {
                self.on_surname_verify(id, text, patient).await
            }
            StepData::AwaitingBirthMonthVerify { patient } => {
                self.on_birth_month_verify(id, text, patient).await
            }
            StepData::AwaitingNewName { document_id } => {
                self.on_new_name(id, text, document_id).await
            }
            StepData::AwaitingNewSurname {
                document_id,
                first_name,
            } => self.on_new_surname(id, text, document_id, first_name).await,
            StepData::AwaitingNewBirthdate {
                document_id,
                first_name,
                last_name,
            } => {
                self.on_new_birthdate(id, text, document_id, first_name, last_name)
                    .await
            }
            StepData::AwaitingNewSex {
                document_id,
                first_name,
                last_name,
                birth_date,
            } => {
                self.on_new_sex(id, text, document_id, first_name, last_name, birth_date)
                    .await
            }
            StepData::AwaitingNewPhone {
                document_id,
                first_name,
                last_name,
                birth_date,
                sex,
            } => {
                self.on_new_phone(id, text, document_id, first_name, last_name, birth_date, sex)
                    .await
            }
            StepData::AwaitingNewEmail {
                document_id,
                first_name,
                last_name,
                birth_date,
                sex,
                phone,
            } => {
                self.on_new_email(
                    id, text, document_id, first_name, last_name, birth_date, sex, phone,
                )
                .await
            }
            StepData::AwaitingTests { patient, cart } => {
                self.on_search(id, text, IntakeStep::AwaitingTests, patient, cart)
                    .await
            }
            StepData::SelectingStudies {
                patient,
                cart,
                candidates,
            } => {
                self.on_selecting_studies(id, text, patient, cart, candidates)
                    .await
            }
            StepData::BuildingCart { patient, cart } => {
                self.on_building_cart(id, text, patient, cart).await
            }
            StepData::Confirming { patient, cart } => {
                self.on_confirming(id, text, patient, cart).await
            }
        }
    }

    // === Identification ===

    async fn on_awaiting_id(
        &self,
        id: &ConversationId,
        text: &str,
    ) -> Result<Vec<Effect>, WorkflowError> {
        let Some(document_id) = tokens::parse_document_id(text) else {
            return Ok(vec![Effect::text(messages::invalid_document_id())]);
        };

        let candidates = match self.directory.find_candidates_by_external_id(&document_id).await {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(conversation = %id, error = %err, "identity lookup failed");
                return self.abort_with_handoff(id).await;
            }
        };

        match candidates.len() {
            0 => {
                self.advance(
                    id,
                    IntakeStep::AwaitingId,
                    StepData::AwaitingNewName { document_id },
                )
                .await?;
                Ok(vec![Effect::text(messages::unknown_id_start_registration())])
            }
            1 => {
                let patient = candidates.into_iter().next().unwrap();
                self.advance(
                    id,
                    IntakeStep::AwaitingId,
                    StepData::AwaitingSurnameVerify { patient },
                )
                .await?;
                Ok(vec![Effect::text(messages::ask_surname())])
            }
            _ => {
                let (text, options) = messages::patient_choices(&candidates);
                self.advance(
                    id,
                    IntakeStep::AwaitingId,
                    StepData::SelectingPatient { candidates },
                )
                .await?;
                Ok(vec![Effect::choices(text, options)])
            }
        }
    }

    async fn on_selecting_patient(
        &self,
        id: &ConversationId,
        text: &str,
        candidates: Vec<PatientRecord>,
    ) -> Result<Vec<Effect>, WorkflowError> {
        let Some(pick) = tokens::parse_selection(text, candidates.len()) else {
            return Ok(vec![Effect::text(messages::invalid_patient_selection(
                candidates.len(),
            ))]);
        };
        let patient = candidates.into_iter().nth(pick - 1).unwrap();
        self.advance(
            id,
            IntakeStep::SelectingPatient,
            StepData::AwaitingSurnameVerify { patient },
        )
        .await?;
        Ok(vec![Effect::text(messages::ask_surname())])
    }

    // === Verification ===

    async fn on_surname_verify(
        &self,
        id: &ConversationId,
        text: &str,
        patient: PatientRecord,
    ) -> Result<Vec<Effect>, WorkflowError> {
        if tokens::surname_matches(text, &patient.last_name) {
            self.advance(
                id,
                IntakeStep::AwaitingSurnameVerify,
                StepData::AwaitingBirthMonthVerify { patient },
            )
            .await?;
            return Ok(vec![Effect::text(messages::ask_birth_month())]);
        }
        self.failed_verification(id, messages::surname_retry).await
    }

    async fn on_birth_month_verify(
        &self,
        id: &ConversationId,
        text: &str,
        patient: PatientRecord,
    ) -> Result<Vec<Effect>, WorkflowError> {
        if tokens::parse_month(text) == Some(patient.birth_date.month()) {
            let identified = IdentifiedPatient::from_record(&patient);
            info!(conversation = %id, patient = %identified.id, "identity verified");
            let reply = messages::verified(&identified);
            self.advance(
                id,
                IntakeStep::AwaitingBirthMonthVerify,
                StepData::AwaitingTests {
                    patient: identified,
                    cart: Cart::new(),
                },
            )
            .await?;
            return Ok(vec![Effect::text(reply)]);
        }
        self.failed_verification(id, messages::birth_month_retry).await
    }

    /// Books one failed verification answer against the shared attempt
    /// counter; locks the conversation out once the budget is spent.
    async fn failed_verification(
        &self,
        id: &ConversationId,
        retry_message: fn(u8) -> String,
    ) -> Result<Vec<Effect>, WorkflowError> {
        let attempts = self
            .store
            .increment_attempts(id, 1)
            .await?
            .unwrap_or(self.settings.max_verify_attempts);
        if attempts >= self.settings.max_verify_attempts {
            self.store.delete(id).await?;
            warn!(conversation = %id, attempts, "verification lockout");
            return Ok(vec![Effect::text(messages::verification_lockout())]);
        }
        Ok(vec![Effect::text(retry_message(
            self.settings.max_verify_attempts - attempts,
        ))])
    }

    // === New-patient registration ===

    async fn on_new_name(
        &self,
        id: &ConversationId,
        text: &str,
        document_id: String,
    ) -> Result<Vec<Effect>, WorkflowError> {
        let Some(first_name) = clean_name(text) else {
            return Ok(vec![Effect::text(messages::invalid_name())]);
        };
        self.advance(
            id,
            IntakeStep::AwaitingNewName,
            StepData::AwaitingNewSurname {
                document_id,
                first_name,
            },
        )
        .await?;
        Ok(vec![Effect::text(messages::ask_last_name())])
    }

    async fn on_new_surname(
        &self,
        id: &ConversationId,
        text: &str,
        document_id: String,
        first_name: String,
    ) -> Result<Vec<Effect>, WorkflowError> {
        let Some(last_name) = clean_name(text) else {
            return Ok(vec![Effect::text(messages::invalid_name())]);
        };
        self.advance(
            id,
            IntakeStep::AwaitingNewSurname,
            StepData::AwaitingNewBirthdate {
                document_id,
                first_name,
                last_name,
            },
        )
        .await?;
        Ok(vec![Effect::text(messages::ask_birth_date())])
    }

    async fn on_new_birthdate(
        &self,
        id: &ConversationId,
        text: &str,
        document_id: String,
        first_name: String,
        last_name: String,
    ) -> Result<Vec<Effect>, WorkflowError> {
        let Some(birth_date) = tokens::parse_birth_date(text) else {
            return Ok(vec![Effect::text(messages::invalid_birth_date())]);
        };
        self.advance(
            id,
            IntakeStep::AwaitingNewBirthdate,
            StepData::AwaitingNewSex {
                document_id,
                first_name,
                last_name,
                birth_date,
            },
        )
        .await?;
        Ok(vec![Effect::text(messages::ask_sex())])
    }

    async fn on_new_sex(
        &self,
        id: &ConversationId,
        text: &str,
        document_id: String,
        first_name: String,
        last_name: String,
        birth_date: NaiveDate,
    ) -> Result<Vec<Effect>, WorkflowError> {
        let Some(sex) = tokens::parse_sex(text) else {
            return Ok(vec![Effect::text(messages::invalid_sex())]);
        };
        self.advance(
            id,
            IntakeStep::AwaitingNewSex,
            StepData::AwaitingNewPhone {
                document_id,
                first_name,
                last_name,
                birth_date,
                sex,
            },
        )
        .await?;
        Ok(vec![Effect::text(messages::ask_phone())])
    }

    async fn on_new_phone(
        &self,
        id: &ConversationId,
        text: &str,
        document_id: String,
        first_name: String,
        last_name: String,
        birth_date: NaiveDate,
        sex: Sex,
    ) -> Result<Vec<Effect>, WorkflowError> {
        let Some(phone) = tokens::parse_phone(text) else {
            return Ok(vec![Effect::text(messages::invalid_phone())]);
        };
        self.advance(
            id,
            IntakeStep::AwaitingNewPhone,
            StepData::AwaitingNewEmail {
                document_id,
                first_name,
                last_name,
                birth_date,
                sex,
                phone,
            },
        )
        .await?;
        Ok(vec![Effect::text(messages::ask_email())])
    }

    #[allow(clippy::too_many_arguments)]
    async fn on_new_email(
        &self,
        id: &ConversationId,
        text: &str,
        document_id: String,
        first_name: String,
        last_name: String,
        birth_date: NaiveDate,
        sex: Sex,
        phone: String,
    ) -> Result<Vec<Effect>, WorkflowError> {
        let email = if tokens::declines_email(text) {
            None
        } else {
            match tokens::parse_email(text) {
                Some(email) => Some(email),
                None => return Ok(vec![Effect::text(messages::invalid_email())]),
            }
        };

        let new_patient = NewPatient {
            document_id,
            first_name,
            last_name,
            birth_date,
            sex,
            phone,
            email,
        };
        let patient_id = match self.directory.create(&new_patient).await {
            Ok(patient_id) => patient_id,
            Err(err) => {
                warn!(conversation = %id, error = %err, "patient creation failed");
                return self.abort_with_handoff(id).await;
            }
        };

        let identified = IdentifiedPatient::from_new(patient_id, &new_patient);
        info!(conversation = %id, patient = %identified.id, "new patient registered");
        let reply = messages::registered(&identified);
        self.advance(
            id,
            IntakeStep::AwaitingNewEmail,
            StepData::AwaitingTests {
                patient: identified,
                cart: Cart::new(),
            },
        )
        .await?;
        Ok(vec![Effect::text(reply)])
    }

    // === Study search and cart ===

    /// Shared search handling for `AwaitingTests` and the default
    /// branch of `BuildingCart`.
    async fn on_search(
        &self,
        id: &ConversationId,
        text: &str,
        from: IntakeStep,
        patient: IdentifiedPatient,
        mut cart: Cart,
    ) -> Result<Vec<Effect>, WorkflowError> {
        let terms = CatalogMatcher::split_terms(text);
        if terms.is_empty() {
            return Ok(vec![Effect::text(messages::no_results())]);
        }

        let catalog = match self.catalog.catalog().await {
            Ok(catalog) => catalog,
            Err(err) => {
                // Degrade to the no-results prompt; the conversation
                // survives a catalog outage.
                warn!(conversation = %id, error = %err, "catalog unavailable during search");
                return Ok(vec![Effect::text(messages::no_results())]);
            }
        };

        let mut added: Vec<String> = Vec::new();
        let mut duplicates: Vec<String> = Vec::new();
        let mut pending: Vec<MatchCandidate> = Vec::new();
        let mut near_misses: Vec<MatchCandidate> = Vec::new();

        for term_matches in self.matcher.match_terms(&terms, &catalog, &self.aliases) {
            let qualifying = term_matches.qualifying(self.settings.match_threshold);
            debug!(
                conversation = %id,
                term = %term_matches.term,
                qualifying = qualifying.len(),
                "search term matched"
            );
            match qualifying.len() {
                0 => {
                    for suggestion in
                        term_matches.suggestions(self.settings.match_threshold, self.settings.max_suggestions)
                    {
                        if !near_misses.iter().any(|c| c.entry.id == suggestion.entry.id) {
                            near_misses.push(suggestion.clone());
                        }
                    }
                }
                1 => {
                    let candidate = qualifying[0];
                    if cart.add(candidate.entry.clone()) {
                        added.push(candidate.entry.display_name.clone());
                    } else {
                        duplicates.push(candidate.entry.display_name.clone());
                    }
                }
                _ => {
                    for candidate in qualifying {
                        if !pending.iter().any(|c| c.entry.id == candidate.entry.id) {
                            pending.push(candidate.clone());
                        }
                    }
                }
            }
        }

        if !pending.is_empty() {
            let offered: Vec<MatchCandidate> = pending
                .iter()
                .take(self.settings.max_study_options)
                .cloned()
                .collect();
            let (prompt, options) = messages::study_choices(&offered);
            let mut effects = Vec::new();
            if !added.is_empty() {
                effects.push(Effect::text(messages::added_to_cart(&added, &cart)));
            }
            effects.push(Effect::choices(prompt, options));
            self.advance(
                id,
                from,
                StepData::SelectingStudies {
                    patient,
                    cart,
                    candidates: pending,
                },
            )
            .await?;
            return Ok(effects);
        }

        if !added.is_empty() {
            let reply = messages::added_to_cart(&added, &cart);
            self.advance(id, from, StepData::BuildingCart { patient, cart })
                .await?;
            return Ok(vec![Effect::text(reply)]);
        }

        if !duplicates.is_empty() {
            // Everything asked for is already in the cart; no state change.
            return Ok(vec![Effect::text(messages::already_in_cart(&duplicates))]);
        }

        near_misses.truncate(self.settings.max_suggestions);
        if near_misses.is_empty() {
            Ok(vec![Effect::text(messages::no_results())])
        } else {
            let refs: Vec<&MatchCandidate> = near_misses.iter().collect();
            Ok(vec![Effect::text(messages::suggestions(&refs))])
        }
    }

    async fn on_selecting_studies(
        &self,
        id: &ConversationId,
        text: &str,
        patient: IdentifiedPatient,
        mut cart: Cart,
        candidates: Vec<MatchCandidate>,
    ) -> Result<Vec<Effect>, WorkflowError> {
        let offered = candidates.len().min(self.settings.max_study_options);

        let picked: Vec<&MatchCandidate> = if tokens::is_select_all(text) {
            candidates.iter().take(offered).collect()
        } else if let Some(pick) = tokens::parse_selection(text, offered) {
            vec![&candidates[pick - 1]]
        } else {
            return Ok(vec![Effect::text(messages::invalid_study_selection(offered))]);
        };

        let mut added: Vec<String> = Vec::new();
        for candidate in picked {
            if cart.add(candidate.entry.clone()) {
                added.push(candidate.entry.display_name.clone());
            }
        }

        let reply = messages::added_to_cart(&added, &cart);
        self.advance(
            id,
            IntakeStep::SelectingStudies,
            StepData::BuildingCart { patient, cart },
        )
        .await?;
        Ok(vec![Effect::text(reply)])
    }

    async fn on_building_cart(
        &self,
        id: &ConversationId,
        text: &str,
        patient: IdentifiedPatient,
        cart: Cart,
    ) -> Result<Vec<Effect>, WorkflowError> {
        if tokens::is_done(text) {
            if cart.is_empty() {
                self.advance(
                    id,
                    IntakeStep::BuildingCart,
                    StepData::AwaitingTests { patient, cart },
                )
                .await?;
                return Ok(vec![Effect::text(messages::empty_cart())]);
            }
            let summary = messages::cart_summary(&patient, &cart);
            self.advance(
                id,
                IntakeStep::BuildingCart,
                StepData::Confirming { patient, cart },
            )
            .await?;
            return Ok(vec![Effect::text(summary)]);
        }

        // Anything else is a new search batch.
        self.on_search(id, text, IntakeStep::BuildingCart, patient, cart)
            .await
    }

    async fn on_confirming(
        &self,
        id: &ConversationId,
        text: &str,
        patient: IdentifiedPatient,
        cart: Cart,
    ) -> Result<Vec<Effect>, WorkflowError> {
        if tokens::is_affirmative(text) {
            let line_items: Vec<QuoteLineItem> = cart.items().iter().map(QuoteLineItem::from).collect();
            let total = cart.total();
            let quote_id = match self.quotes.create(patient.id, line_items, total).await {
                Ok(quote_id) => quote_id,
                Err(err) => {
                    warn!(conversation = %id, error = %err, "quote persistence failed");
                    return self.abort_with_handoff(id).await;
                }
            };
            self.store.delete(id).await?;
            info!(conversation = %id, quote = %quote_id, total = %total, "quote committed");
            return Ok(vec![Effect::text(messages::quote_committed(&quote_id, total))]);
        }

        if tokens::is_negative(text) {
            self.store.delete(id).await?;
            info!(conversation = %id, "quote rejected at confirmation");
            return Ok(vec![Effect::text(messages::cancelled())]);
        }

        Ok(vec![Effect::text(messages::confirm_reprompt())])
    }

    // === Shared helpers ===

    /// Validates the step transition and stores the next step's data.
    async fn advance(
        &self,
        id: &ConversationId,
        from: IntakeStep,
        data: StepData,
    ) -> Result<(), WorkflowError> {
        let to = data.step();
        if from != to {
            from.transition_to(to)?;
            debug!(conversation = %id, from = ?from, to = ?to, "step transition");
        }
        self.store.update_data(id, data).await?;
        Ok(())
    }

    /// Deletes the state and hands the user off to a human channel.
    async fn abort_with_handoff(&self, id: &ConversationId) -> Result<Vec<Effect>, WorkflowError> {
        self.store.delete(id).await?;
        Ok(vec![Effect::text(messages::handoff())])
    }
}

/// Trims a name answer; rejects empty or single-character input.
fn clean_name(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (trimmed.chars().count() >= 2).then(|| trimmed.to_string())
}
