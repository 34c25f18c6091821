// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use carbid_domain::{
    ADDITIONAL_STAGE_TITLE, ChecklistAnswers, DomainError, OperatorId, StageDescriptor, StagePlan,
};
use std::collections::HashMap;

/// The step a wizard session is currently waiting on.
///
/// The wizard walks an operator through one claimed bid: a precheck
/// (are you at the dealer, or when will you be), the ordered photo
/// stages, the checklist questions, and finally submission. Rework
/// re-enters through the additional-materials bucket and skips the
/// checklist, which was already answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    /// Asking whether the operator is already at the dealer.
    PrecheckDecision,
    /// Waiting for a reviewer to resolve a requested consultation.
    ConsultWait,
    /// Waiting for the operator to type an arrival time.
    ArrivalEntry,
    /// Collecting files for the plan stage at this zero-based index.
    PhotoStage(usize),
    /// Collecting rework material in the additional bucket.
    PhotoAdditional,
    /// Asking the checklist question with this 1-based index.
    ChecklistQuestion(u8),
    /// Everything collected; waiting for the submit action.
    ReadyToSubmit,
}

impl WizardState {
    /// A short stable name for the step, used in errors and logs.
    #[must_use]
    pub const fn step_name(&self) -> &'static str {
        match self {
            Self::PrecheckDecision => "precheck_decision",
            Self::ConsultWait => "consult_wait",
            Self::ArrivalEntry => "arrival_entry",
            Self::PhotoStage(_) => "photo_stage",
            Self::PhotoAdditional => "photo_additional",
            Self::ChecklistQuestion(_) => "checklist_question",
            Self::ReadyToSubmit => "ready_to_submit",
        }
    }
}

/// One operator's in-flight walk through the wizard for one bid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSession {
    /// The bid being worked.
    pub bid_id: i64,
    /// The operator walking the wizard.
    pub operator_id: OperatorId,
    /// The step currently waiting on input.
    pub state: WizardState,
}

/// Tracks wizard sessions, at most one per operator.
///
/// Sessions are in-memory only: a restart drops them and operators
/// re-enter the wizard from their claimed bid. The bid itself, its
/// files, and its checklist answers all live in storage and survive.
#[derive(Debug, Default)]
pub struct SessionTracker {
    sessions: HashMap<OperatorId, WizardSession>,
}

impl SessionTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Returns the operator's session, if one is in flight.
    #[must_use]
    pub fn get(&self, operator_id: OperatorId) -> Option<&WizardSession> {
        self.sessions.get(&operator_id)
    }

    /// Starts a fresh session at the precheck step.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::SessionAlreadyActive` if the operator already
    /// has a session in flight.
    pub fn begin(&mut self, operator_id: OperatorId, bid_id: i64) -> Result<(), CoreError> {
        if let Some(existing) = self.sessions.get(&operator_id) {
            return Err(CoreError::SessionAlreadyActive {
                operator_id,
                bid_id: existing.bid_id,
            });
        }
        self.sessions.insert(
            operator_id,
            WizardSession {
                bid_id,
                operator_id,
                state: WizardState::PrecheckDecision,
            },
        );
        Ok(())
    }

    /// Re-enters the wizard at the additional-materials bucket after a
    /// rework request.
    ///
    /// If the operator still has a session for the same bid it is moved
    /// in place; if they have none (for example after a restart) a new
    /// one is created directly in the rework step.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::SessionAlreadyActive` if the operator has a
    /// session for a different bid.
    pub fn begin_rework(&mut self, operator_id: OperatorId, bid_id: i64) -> Result<(), CoreError> {
        if let Some(existing) = self.sessions.get_mut(&operator_id) {
            if existing.bid_id != bid_id {
                return Err(CoreError::SessionAlreadyActive {
                    operator_id,
                    bid_id: existing.bid_id,
                });
            }
            existing.state = WizardState::PhotoAdditional;
            return Ok(());
        }
        self.sessions.insert(
            operator_id,
            WizardSession {
                bid_id,
                operator_id,
                state: WizardState::PhotoAdditional,
            },
        );
        Ok(())
    }

    /// The operator is already at the dealer; skip arrival entry and
    /// start the first photo stage.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NoActiveSession` or `CoreError::UnexpectedStep`.
    pub fn confirm_on_site(&mut self, operator_id: OperatorId) -> Result<WizardState, CoreError> {
        let session: &mut WizardSession = self.session_mut(operator_id)?;
        match session.state {
            WizardState::PrecheckDecision => {
                session.state = WizardState::PhotoStage(0);
                Ok(session.state)
            }
            other => Err(unexpected(operator_id, other)),
        }
    }

    /// The operator is not at the dealer yet; ask for an arrival time.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NoActiveSession` or `CoreError::UnexpectedStep`.
    pub fn defer_arrival(&mut self, operator_id: OperatorId) -> Result<WizardState, CoreError> {
        let session: &mut WizardSession = self.session_mut(operator_id)?;
        match session.state {
            WizardState::PrecheckDecision => {
                session.state = WizardState::ArrivalEntry;
                Ok(session.state)
            }
            other => Err(unexpected(operator_id, other)),
        }
    }

    /// The operator needs a consultation before starting; park the
    /// session until a reviewer resolves it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NoActiveSession` or `CoreError::UnexpectedStep`.
    pub fn request_consult(&mut self, operator_id: OperatorId) -> Result<WizardState, CoreError> {
        let session: &mut WizardSession = self.session_mut(operator_id)?;
        match session.state {
            WizardState::PrecheckDecision => {
                session.state = WizardState::ConsultWait;
                Ok(session.state)
            }
            other => Err(unexpected(operator_id, other)),
        }
    }

    /// Resolves a pending consultation for the given bid and routes the
    /// session into the first photo stage.
    ///
    /// The wait is keyed by bid: competing resolutions race, the first
    /// one wins, and every later call finds no session waiting and
    /// returns `None`.
    pub fn resolve_consult(&mut self, bid_id: i64) -> Option<(OperatorId, WizardState)> {
        let session: &mut WizardSession = self
            .sessions
            .values_mut()
            .find(|s| s.bid_id == bid_id && s.state == WizardState::ConsultWait)?;
        session.state = WizardState::PhotoStage(0);
        Some((session.operator_id, session.state))
    }

    /// An arrival time was recorded; start the first photo stage.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NoActiveSession` or `CoreError::UnexpectedStep`.
    pub fn record_arrival(&mut self, operator_id: OperatorId) -> Result<WizardState, CoreError> {
        let session: &mut WizardSession = self.session_mut(operator_id)?;
        match session.state {
            WizardState::ArrivalEntry => {
                session.state = WizardState::PhotoStage(0);
                Ok(session.state)
            }
            other => Err(unexpected(operator_id, other)),
        }
    }

    /// Finishes the current photo stage and advances.
    ///
    /// `files_in_stage` is the number of files recorded for the current
    /// stage; a required stage cannot be finished with zero. The session
    /// moves to the next stage, or to the first checklist question after
    /// the last one.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NoActiveSession`, `CoreError::UnexpectedStep`,
    /// or a `DomainError` wrapped in `CoreError::DomainViolation` when the
    /// stage index is invalid or a required stage is empty.
    pub fn complete_stage(
        &mut self,
        operator_id: OperatorId,
        plan: &StagePlan,
        files_in_stage: usize,
    ) -> Result<WizardState, CoreError> {
        let session: &mut WizardSession = self.session_mut(operator_id)?;
        match session.state {
            WizardState::PhotoStage(index) => {
                let stage: &StageDescriptor = plan
                    .get(index)
                    .ok_or(DomainError::StageNotFound(index))?;
                if stage.required && files_in_stage == 0 {
                    return Err(CoreError::DomainViolation(DomainError::StageIncomplete {
                        stage_title: stage.title.clone(),
                    }));
                }
                session.state = if plan.is_last(index) {
                    WizardState::ChecklistQuestion(1)
                } else {
                    WizardState::PhotoStage(index + 1)
                };
                Ok(session.state)
            }
            other => Err(unexpected(operator_id, other)),
        }
    }

    /// Finishes the rework bucket; at least one file is required.
    ///
    /// Rework skips the checklist, so the session goes straight to
    /// `ReadyToSubmit`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NoActiveSession`, `CoreError::UnexpectedStep`,
    /// or `DomainError::StageIncomplete` wrapped in `CoreError` when no
    /// file was recorded.
    pub fn finish_rework(
        &mut self,
        operator_id: OperatorId,
        files_in_stage: usize,
    ) -> Result<WizardState, CoreError> {
        let session: &mut WizardSession = self.session_mut(operator_id)?;
        match session.state {
            WizardState::PhotoAdditional => {
                if files_in_stage == 0 {
                    return Err(CoreError::DomainViolation(DomainError::StageIncomplete {
                        stage_title: String::from(ADDITIONAL_STAGE_TITLE),
                    }));
                }
                session.state = WizardState::ReadyToSubmit;
                Ok(session.state)
            }
            other => Err(unexpected(operator_id, other)),
        }
    }

    /// Records that the current checklist question was answered and
    /// advances to the next one, or to `ReadyToSubmit` after the last.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NoActiveSession` or `CoreError::UnexpectedStep`.
    pub fn answer_question(&mut self, operator_id: OperatorId) -> Result<WizardState, CoreError> {
        let session: &mut WizardSession = self.session_mut(operator_id)?;
        match session.state {
            WizardState::ChecklistQuestion(q) => {
                session.state = if q >= ChecklistAnswers::QUESTION_COUNT {
                    WizardState::ReadyToSubmit
                } else {
                    WizardState::ChecklistQuestion(q + 1)
                };
                Ok(session.state)
            }
            other => Err(unexpected(operator_id, other)),
        }
    }

    /// Removes and returns the operator's session.
    ///
    /// Called after a successful submission or a decline.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NoActiveSession` if none is in flight.
    pub fn end(&mut self, operator_id: OperatorId) -> Result<WizardSession, CoreError> {
        self.sessions
            .remove(&operator_id)
            .ok_or(CoreError::NoActiveSession(operator_id))
    }

    /// Drops an operator's session if one exists. Safe to call twice.
    pub fn abort(&mut self, operator_id: OperatorId) {
        self.sessions.remove(&operator_id);
    }

    /// Number of sessions in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns whether no session is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn session_mut(&mut self, operator_id: OperatorId) -> Result<&mut WizardSession, CoreError> {
        self.sessions
            .get_mut(&operator_id)
            .ok_or(CoreError::NoActiveSession(operator_id))
    }
}

const fn unexpected(operator_id: OperatorId, state: WizardState) -> CoreError {
    CoreError::UnexpectedStep {
        operator_id,
        expected: state.step_name(),
    }
}
