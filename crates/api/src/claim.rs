// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Claiming a bid out of the open pool.

use crate::error::{ApiError, translate_persistence_error};
use crate::request_response::{ClaimBidRequest, ClaimBidResponse};
use carbid::{SessionTracker, WizardSession};
use carbid_domain::Bid;
use carbid_notify::{Outbound, Recipient};
use carbid_persistence::{OperatorRow, Persistence};
use tracing::info;

/// Claims an open bid for an operator and starts their wizard session.
///
/// The claim itself is a single conditional update in storage, so two
/// operators racing for the same bid cannot both win. The session check
/// happens first: an operator already mid-wizard cannot take a second
/// bid, and must not be able to knock a bid out of the pool by trying.
/// Administrators get an assignment notice.
///
/// # Errors
///
/// Returns `ApiError::Conflict` if the operator has a session in flight
/// or the claim raced and lost, and `ApiError::ResourceNotFound` if the
/// bid does not exist.
pub fn claim_bid(
    db: &mut Persistence,
    sessions: &mut SessionTracker,
    bid_id: i64,
    request: &ClaimBidRequest,
) -> Result<(ClaimBidResponse, Vec<Outbound>), ApiError> {
    if let Some(existing) = sessions.get(request.operator_id) {
        return Err(ApiError::Conflict {
            message: format!(
                "Operator {} already has a session for bid {}",
                request.operator_id, existing.bid_id
            ),
        });
    }

    let bid: Bid = db
        .claim_bid(bid_id, request.operator_id)
        .map_err(translate_persistence_error)?;
    info!(bid_id, operator_id = request.operator_id, "bid claimed");

    // Cannot fail: the session check above ran on the same tracker.
    if sessions.begin(request.operator_id, bid_id).is_err() {
        return Err(ApiError::Internal {
            message: format!(
                "Session for operator {} appeared during claim",
                request.operator_id
            ),
        });
    }
    let session: &WizardSession = sessions.get(request.operator_id).ok_or(ApiError::Internal {
        message: String::from("Session vanished after begin"),
    })?;

    let admins: Vec<OperatorRow> = db
        .operators_with_role("admin")
        .map_err(translate_persistence_error)?;
    let text: String = format!(
        "Bid #{bid_id} ({}) claimed by operator {}",
        bid.vehicle.display_name(),
        request.operator_id
    );
    let outbounds: Vec<Outbound> = admins
        .into_iter()
        .map(|admin| Outbound::new(Recipient::Admin(admin.operator_id), text.clone()))
        .collect();

    let response: ClaimBidResponse = ClaimBidResponse {
        bid_id: bid.bid_id.unwrap_or(bid_id),
        operator_id: request.operator_id,
        step: session.state.step_name().to_string(),
    };
    Ok((response, outbounds))
}
