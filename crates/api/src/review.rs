// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Review decisions: approval and rework.

use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::request_response::{ApproveRequest, BidStatusResponse, ReworkRequest};
use carbid::{Command, SessionTracker, TransitionResult, apply};
use carbid_audit::Actor;
use carbid_domain::{Bid, OperatorId};
use carbid_notify::{Outbound, Recipient, render_rework_notice};
use carbid_persistence::Persistence;
use tracing::info;

/// Approves a submitted bid and closes it.
///
/// The operator who ran the inspection gets a completion notice.
///
/// # Errors
///
/// Returns a translated error if the bid does not exist or is not in
/// review.
pub fn approve(
    db: &mut Persistence,
    bid_id: i64,
    request: &ApproveRequest,
) -> Result<(BidStatusResponse, Vec<Outbound>), ApiError> {
    let bid: Bid = db.get_bid(bid_id).map_err(translate_persistence_error)?;
    // Approval clears the manager; remember who held the bid.
    let holder: Option<OperatorId> = bid.manager_id;
    let result: TransitionResult = apply(
        &bid,
        Command::ApproveBid,
        Actor::Reviewer(request.reviewer_id),
    )
    .map_err(translate_core_error)?;
    db.persist_transition(&result)
        .map_err(translate_persistence_error)?;
    info!(bid_id, reviewer_id = request.reviewer_id, "bid approved");

    let outbounds: Vec<Outbound> = holder
        .map(|operator_id| {
            Outbound::new(
                Recipient::Operator(operator_id),
                format!("Bid #{bid_id} approved. The inspection is complete."),
            )
        })
        .into_iter()
        .collect();

    let response: BidStatusResponse = BidStatusResponse {
        bid_id,
        status: result.new_bid.status.as_str().to_string(),
    };
    Ok((response, outbounds))
}

/// Sends a submitted bid back to its operator for more material.
///
/// The operator keeps the bid; their wizard re-enters at the
/// additional-materials bucket and they get a notice carrying the
/// reviewer's note.
///
/// # Errors
///
/// Returns a translated error if the bid does not exist, is not in
/// review, or the write fails.
pub fn request_rework(
    db: &mut Persistence,
    sessions: &mut SessionTracker,
    bid_id: i64,
    request: &ReworkRequest,
) -> Result<(BidStatusResponse, Vec<Outbound>), ApiError> {
    let bid: Bid = db.get_bid(bid_id).map_err(translate_persistence_error)?;
    let result: TransitionResult = apply(
        &bid,
        Command::RequestRework {
            note: request.note.clone(),
        },
        Actor::Reviewer(request.reviewer_id),
    )
    .map_err(translate_core_error)?;
    db.persist_transition(&result)
        .map_err(translate_persistence_error)?;

    let mut outbounds: Vec<Outbound> = Vec::new();
    if let Some(manager_id) = result.new_bid.manager_id {
        let manager: OperatorId = manager_id;
        sessions
            .begin_rework(manager, bid_id)
            .map_err(translate_core_error)?;
        outbounds.push(Outbound::new(
            Recipient::Operator(manager),
            render_rework_notice(&result.new_bid, request.note.as_deref()),
        ));
    }
    info!(bid_id, reviewer_id = request.reviewer_id, "rework requested");

    let response: BidStatusResponse = BidStatusResponse {
        bid_id,
        status: result.new_bid.status.as_str().to_string(),
    };
    Ok((response, outbounds))
}
