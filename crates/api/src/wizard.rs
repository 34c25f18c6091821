// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The inspection wizard: arrival, photo stages, checklist, submission.
//!
//! Session state lives in the tracker and is advanced only after the
//! matching storage write lands, so a failed write leaves the wizard
//! where it was.

use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_file_error,
    translate_persistence_error,
};
use crate::request_response::{
    ArrivalRequest, BatchStoreResponse, BidStatusResponse, ChecklistAnswerRequest,
    CompleteStageRequest, ConsultRequest, ConsultResolveRequest, ConsultResolveResponse,
    DeclineRequest, FailedFile, PrecheckRequest, StoredFileResponse, SubmitRequest,
    WizardStepResponse,
};
use carbid::{Command, SessionTracker, TransitionResult, WizardSession, WizardState, apply};
use carbid_audit::Actor;
use carbid_domain::{
    ADDITIONAL_STAGE_TITLE, Bid, OperatorId, StageDescriptor, StagePlan,
};
use carbid_files::{BatchOutcome, StageStore, StoredFile};
use carbid_notify::{Outbound, Recipient, render_review_package};
use carbid_persistence::{BidFileRow, OperatorRow, Persistence};
use time::OffsetDateTime;
use tracing::info;

/// Answers the on-site precheck.
///
/// An operator already at the dealer gets their arrival stamped with
/// the current time and goes straight to the first photo stage; one who
/// is not gets asked for an arrival time.
///
/// # Errors
///
/// Returns a translated error if the operator has no session, the
/// session is past the precheck, or the write fails.
pub fn precheck(
    db: &mut Persistence,
    sessions: &mut SessionTracker,
    request: &PrecheckRequest,
) -> Result<WizardStepResponse, ApiError> {
    let session: &WizardSession = session_for(sessions, request.operator_id)?;
    let bid_id: i64 = session.bid_id;
    require_step(session, WizardState::PrecheckDecision)?;

    if request.on_site {
        save_arrival(db, bid_id, request.operator_id, OffsetDateTime::now_utc())?;
        let state: WizardState = sessions
            .confirm_on_site(request.operator_id)
            .map_err(translate_core_error)?;
        return Ok(WizardStepResponse {
            bid_id,
            step: state.step_name().to_string(),
        });
    }

    let state: WizardState = sessions
        .defer_arrival(request.operator_id)
        .map_err(translate_core_error)?;
    Ok(WizardStepResponse {
        bid_id,
        step: state.step_name().to_string(),
    })
}

/// Records the typed arrival time after a deferred precheck.
///
/// # Errors
///
/// Returns a translated error if the session is not waiting on an
/// arrival time or the write fails.
pub fn record_arrival(
    db: &mut Persistence,
    sessions: &mut SessionTracker,
    request: &ArrivalRequest,
) -> Result<WizardStepResponse, ApiError> {
    let session: &WizardSession = session_for(sessions, request.operator_id)?;
    let bid_id: i64 = session.bid_id;
    require_step(session, WizardState::ArrivalEntry)?;

    save_arrival(db, bid_id, request.operator_id, request.arrived_at)?;
    let state: WizardState = sessions
        .record_arrival(request.operator_id)
        .map_err(translate_core_error)?;
    Ok(WizardStepResponse {
        bid_id,
        step: state.step_name().to_string(),
    })
}

/// Parks the wizard until a reviewer resolves a consultation.
///
/// The operator needs an answer (typically the customer is still
/// deciding) before starting the inspection; nothing else can advance
/// the session while it waits.
///
/// # Errors
///
/// Returns a translated error if the operator has no session or the
/// session is past the precheck.
pub fn request_consult(
    sessions: &mut SessionTracker,
    request: &ConsultRequest,
) -> Result<WizardStepResponse, ApiError> {
    let session: &WizardSession = session_for(sessions, request.operator_id)?;
    let bid_id: i64 = session.bid_id;
    require_step(session, WizardState::PrecheckDecision)?;

    let state: WizardState = sessions
        .request_consult(request.operator_id)
        .map_err(translate_core_error)?;
    info!(bid_id, operator_id = request.operator_id, "consultation requested");
    Ok(WizardStepResponse {
        bid_id,
        step: state.step_name().to_string(),
    })
}

/// Resolves a pending consultation for a bid.
///
/// The first resolution wins and routes the waiting operator into the
/// photo stages with the reviewer's answer; competing or repeated
/// resolutions find nobody waiting and report `resolved: false`.
pub fn resolve_consult(
    sessions: &mut SessionTracker,
    bid_id: i64,
    request: &ConsultResolveRequest,
) -> (ConsultResolveResponse, Vec<Outbound>) {
    let Some((operator_id, state)) = sessions.resolve_consult(bid_id) else {
        return (
            ConsultResolveResponse {
                bid_id,
                resolved: false,
                step: None,
            },
            Vec::new(),
        );
    };

    info!(
        bid_id,
        operator_id,
        reviewer_id = request.reviewer_id,
        "consultation resolved"
    );
    let text: String = request.note.as_ref().map_or_else(
        || format!("Consultation for bid #{bid_id} resolved. Continue the inspection."),
        |note| format!("Consultation for bid #{bid_id} resolved: {note}"),
    );
    let outbounds: Vec<Outbound> = vec![Outbound::new(Recipient::Operator(operator_id), text)];
    (
        ConsultResolveResponse {
            bid_id,
            resolved: true,
            step: Some(state.step_name().to_string()),
        },
        outbounds,
    )
}

/// Stores one file into the session's current stage bucket.
///
/// # Errors
///
/// Returns a translated error if the session is not collecting files,
/// the file is oversized or unnameable, or a write fails.
pub async fn store_file(
    db: &mut Persistence,
    sessions: &SessionTracker,
    store: &StageStore,
    plan: &StagePlan,
    operator_id: OperatorId,
    file_name: &str,
    bytes: &[u8],
) -> Result<StoredFileResponse, ApiError> {
    let session: &WizardSession = session_for(sessions, operator_id)?;
    let bid_id: i64 = session.bid_id;
    let stage_title: String = current_stage_title(session, plan)?;

    let stored: StoredFile = store
        .record(operator_id, bid_id, &stage_title, file_name, bytes)
        .await
        .map_err(translate_file_error)?;
    db.record_file(bid_id, &stage_title, &stored.file_name, stored.kind)
        .map_err(translate_persistence_error)?;

    Ok(StoredFileResponse {
        file_name: stored.file_name,
        stage_title,
        kind: stored.kind.as_str().to_string(),
    })
}

/// Stores a batch of files into the session's current stage bucket.
///
/// Every file is attempted; failures are reported per file and do not
/// roll back siblings that landed.
///
/// # Errors
///
/// Returns a translated error if the session is not collecting files or
/// a file record cannot be written to the database.
pub async fn store_batch(
    db: &mut Persistence,
    sessions: &SessionTracker,
    store: &StageStore,
    plan: &StagePlan,
    operator_id: OperatorId,
    files: Vec<(String, Vec<u8>)>,
) -> Result<BatchStoreResponse, ApiError> {
    let session: &WizardSession = session_for(sessions, operator_id)?;
    let bid_id: i64 = session.bid_id;
    let stage_title: String = current_stage_title(session, plan)?;

    let outcome: BatchOutcome = store
        .record_batch(operator_id, bid_id, &stage_title, files)
        .await;

    let mut stored: Vec<StoredFileResponse> = Vec::with_capacity(outcome.stored.len());
    for file in outcome.stored {
        db.record_file(bid_id, &stage_title, &file.file_name, file.kind)
            .map_err(translate_persistence_error)?;
        stored.push(StoredFileResponse {
            file_name: file.file_name,
            stage_title: stage_title.clone(),
            kind: file.kind.as_str().to_string(),
        });
    }
    let failed: Vec<FailedFile> = outcome
        .failed
        .into_iter()
        .map(|(file_name, err)| FailedFile {
            file_name,
            reason: err.to_string(),
        })
        .collect();

    Ok(BatchStoreResponse { stored, failed })
}

/// Finishes the current stage and advances the wizard.
///
/// For a plan stage the file count is checked against the stage's
/// required flag; the rework bucket always requires at least one file.
///
/// # Errors
///
/// Returns a translated error if the stage is incomplete or the session
/// is not collecting files.
pub async fn complete_stage(
    sessions: &mut SessionTracker,
    store: &StageStore,
    plan: &StagePlan,
    request: &CompleteStageRequest,
) -> Result<WizardStepResponse, ApiError> {
    let session: &WizardSession = session_for(sessions, request.operator_id)?;
    let bid_id: i64 = session.bid_id;

    let state: WizardState = match session.state {
        WizardState::PhotoStage(index) => {
            let stage: &StageDescriptor = plan
                .get(index)
                .ok_or_else(|| translate_domain_error(
                    carbid_domain::DomainError::StageNotFound(index),
                ))?;
            let count: usize = store
                .count_in_stage(request.operator_id, bid_id, &stage.title)
                .await
                .map_err(translate_file_error)?;
            sessions
                .complete_stage(request.operator_id, plan, count)
                .map_err(translate_core_error)?
        }
        WizardState::PhotoAdditional => {
            let count: usize = store
                .count_in_stage(request.operator_id, bid_id, ADDITIONAL_STAGE_TITLE)
                .await
                .map_err(translate_file_error)?;
            sessions
                .finish_rework(request.operator_id, count)
                .map_err(translate_core_error)?
        }
        other => {
            return Err(ApiError::Conflict {
                message: format!(
                    "Session for operator {} is waiting on {}",
                    request.operator_id,
                    other.step_name()
                ),
            });
        }
    };

    Ok(WizardStepResponse {
        bid_id,
        step: state.step_name().to_string(),
    })
}

/// Records one checklist answer and advances to the next question.
///
/// The question index must match the one the session is waiting on;
/// out-of-order answers are rejected.
///
/// # Errors
///
/// Returns a translated error on index mismatch, a missing session, or
/// a failed write.
pub fn answer_checklist(
    db: &mut Persistence,
    sessions: &mut SessionTracker,
    request: &ChecklistAnswerRequest,
) -> Result<WizardStepResponse, ApiError> {
    let session: &WizardSession = session_for(sessions, request.operator_id)?;
    let bid_id: i64 = session.bid_id;
    match session.state {
        WizardState::ChecklistQuestion(q) if q == request.question => {}
        WizardState::ChecklistQuestion(q) => {
            return Err(ApiError::Conflict {
                message: format!("Expected an answer for question {q}, got {}", request.question),
            });
        }
        other => {
            return Err(ApiError::Conflict {
                message: format!(
                    "Session for operator {} is waiting on {}",
                    request.operator_id,
                    other.step_name()
                ),
            });
        }
    }

    let mut bid: Bid = db.get_bid(bid_id).map_err(translate_persistence_error)?;
    bid.checklist
        .set_answer(request.question, request.answer.clone())
        .map_err(translate_domain_error)?;
    db.save_bid(&bid).map_err(translate_persistence_error)?;

    let state: WizardState = sessions
        .answer_question(request.operator_id)
        .map_err(translate_core_error)?;
    Ok(WizardStepResponse {
        bid_id,
        step: state.step_name().to_string(),
    })
}

/// Submits the collected material for review and ends the session.
///
/// Administrators get the review package: a header, what was collected
/// per stage, and the checklist answers.
///
/// # Errors
///
/// Returns a translated error if the wizard is not at the submit step,
/// the checklist is incomplete, or the write fails.
pub fn submit(
    db: &mut Persistence,
    sessions: &mut SessionTracker,
    request: &SubmitRequest,
) -> Result<(BidStatusResponse, Vec<Outbound>), ApiError> {
    let session: &WizardSession = session_for(sessions, request.operator_id)?;
    let bid_id: i64 = session.bid_id;
    require_step(session, WizardState::ReadyToSubmit)?;

    let bid: Bid = db.get_bid(bid_id).map_err(translate_persistence_error)?;
    let result: TransitionResult = apply(
        &bid,
        Command::SubmitForReview {
            operator_id: request.operator_id,
        },
        Actor::Operator(request.operator_id),
    )
    .map_err(translate_core_error)?;
    db.persist_transition(&result)
        .map_err(translate_persistence_error)?;
    sessions.end(request.operator_id).map_err(translate_core_error)?;
    info!(bid_id, operator_id = request.operator_id, "bid submitted for review");

    let files: Vec<BidFileRow> = db
        .files_for_bid(bid_id)
        .map_err(translate_persistence_error)?;
    let admins: Vec<OperatorRow> = db
        .operators_with_role("admin")
        .map_err(translate_persistence_error)?;
    let text: String = render_review_package(
        &result.new_bid,
        request.operator_id,
        &stage_counts(&files),
    );
    let outbounds: Vec<Outbound> = admins
        .into_iter()
        .map(|admin| Outbound::new(Recipient::Admin(admin.operator_id), text.clone()))
        .collect();

    let response: BidStatusResponse = BidStatusResponse {
        bid_id,
        status: result.new_bid.status.as_str().to_string(),
    };
    Ok((response, outbounds))
}

/// Gives the operator's held bid back to the open pool.
///
/// The wizard session is dropped; files already stored stay where they
/// are, but the bid's arrival and checklist state are cleared so the
/// next operator starts clean. Administrators get a notice carrying the
/// operator's reason, when one was given.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the operator holds nothing,
/// or a translated error if the write fails.
pub fn decline(
    db: &mut Persistence,
    sessions: &mut SessionTracker,
    request: &DeclineRequest,
) -> Result<(BidStatusResponse, Vec<Outbound>), ApiError> {
    let bid: Bid = db
        .bid_held_by(request.operator_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Bid"),
            message: format!("Operator {} holds no bid", request.operator_id),
        })?;
    let bid_id: i64 = bid.id().map_err(translate_domain_error)?;

    let result: TransitionResult = apply(
        &bid,
        Command::DeclineBid {
            operator_id: request.operator_id,
            reason: request.reason.clone(),
        },
        Actor::Operator(request.operator_id),
    )
    .map_err(translate_core_error)?;
    db.persist_transition(&result)
        .map_err(translate_persistence_error)?;
    sessions.abort(request.operator_id);
    info!(bid_id, operator_id = request.operator_id, "bid declined back to the pool");

    let admins: Vec<OperatorRow> = db
        .operators_with_role("admin")
        .map_err(translate_persistence_error)?;
    let text: String = request.reason.as_ref().map_or_else(
        || {
            format!(
                "Bid #{bid_id} declined by operator {} and returned to the pool",
                request.operator_id
            )
        },
        |reason| {
            format!(
                "Bid #{bid_id} declined by operator {}: {reason}",
                request.operator_id
            )
        },
    );
    let outbounds: Vec<Outbound> = admins
        .into_iter()
        .map(|admin| Outbound::new(Recipient::Admin(admin.operator_id), text.clone()))
        .collect();

    let response: BidStatusResponse = BidStatusResponse {
        bid_id,
        status: result.new_bid.status.as_str().to_string(),
    };
    Ok((response, outbounds))
}

/// Per-stage file counts in first-recorded order.
fn stage_counts(files: &[BidFileRow]) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for file in files {
        match counts.iter_mut().find(|(title, _)| *title == file.stage_title) {
            Some((_, count)) => *count += 1,
            None => counts.push((file.stage_title.clone(), 1)),
        }
    }
    counts
}

fn session_for(
    sessions: &SessionTracker,
    operator_id: OperatorId,
) -> Result<&WizardSession, ApiError> {
    sessions
        .get(operator_id)
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Wizard session"),
            message: format!("Operator {operator_id} has no wizard session in flight"),
        })
}

fn require_step(session: &WizardSession, wanted: WizardState) -> Result<(), ApiError> {
    if session.state == wanted {
        Ok(())
    } else {
        Err(ApiError::Conflict {
            message: format!(
                "Session for operator {} is waiting on {}",
                session.operator_id,
                session.state.step_name()
            ),
        })
    }
}

fn current_stage_title(session: &WizardSession, plan: &StagePlan) -> Result<String, ApiError> {
    match session.state {
        WizardState::PhotoStage(index) => plan
            .get(index)
            .map(|stage| stage.title.clone())
            .ok_or_else(|| {
                translate_domain_error(carbid_domain::DomainError::StageNotFound(index))
            }),
        WizardState::PhotoAdditional => Ok(String::from(ADDITIONAL_STAGE_TITLE)),
        other => Err(ApiError::Conflict {
            message: format!(
                "Session for operator {} is waiting on {}",
                session.operator_id,
                other.step_name()
            ),
        }),
    }
}

fn save_arrival(
    db: &mut Persistence,
    bid_id: i64,
    operator_id: OperatorId,
    arrived_at: OffsetDateTime,
) -> Result<(), ApiError> {
    let bid: Bid = db.get_bid(bid_id).map_err(translate_persistence_error)?;
    let result: TransitionResult = apply(
        &bid,
        Command::SaveArrival {
            operator_id,
            arrived_at,
        },
        Actor::Operator(operator_id),
    )
    .map_err(translate_core_error)?;
    db.persist_transition(&result)
        .map_err(translate_persistence_error)?;
    Ok(())
}
