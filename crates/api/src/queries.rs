// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only views of the pool and individual bids.

use crate::error::{ApiError, translate_persistence_error};
use crate::request_response::{AuditEntry, BidDetailResponse, BidSummary, FileInfo};
use carbid_audit::{Actor, AuditEvent};
use carbid_domain::{Bid, BidStatus, OperatorId};
use carbid_persistence::{BidFileRow, Persistence};

/// Lists every bid sitting in the open pool, oldest first.
///
/// # Errors
///
/// Returns a translated error if the query fails.
pub fn open_pool(db: &mut Persistence) -> Result<Vec<BidSummary>, ApiError> {
    let bids: Vec<Bid> = db
        .bids_with_status(BidStatus::Open)
        .map_err(translate_persistence_error)?;
    Ok(bids.iter().map(BidSummary::from_bid).collect())
}

/// Lists the bids an operator can act on for one company: the open,
/// unclaimed pool plus whatever the operator already holds there.
///
/// # Errors
///
/// Returns a translated error if the query fails.
pub fn available_for_company(
    db: &mut Persistence,
    company_id: i64,
    operator_id: OperatorId,
) -> Result<Vec<BidSummary>, ApiError> {
    let bids: Vec<Bid> = db
        .available_bids_for_company(company_id, operator_id)
        .map_err(translate_persistence_error)?;
    Ok(bids.iter().map(BidSummary::from_bid).collect())
}

/// The bid an operator currently holds, if any.
///
/// # Errors
///
/// Returns a translated error if the query fails.
pub fn held_bid(
    db: &mut Persistence,
    operator_id: OperatorId,
) -> Result<Option<BidSummary>, ApiError> {
    let bid: Option<Bid> = db
        .bid_held_by(operator_id)
        .map_err(translate_persistence_error)?;
    Ok(bid.as_ref().map(BidSummary::from_bid))
}

/// Full detail for one bid: fields, recorded files, and audit trail.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the bid does not exist.
pub fn bid_detail(db: &mut Persistence, bid_id: i64) -> Result<BidDetailResponse, ApiError> {
    let bid: Bid = db.get_bid(bid_id).map_err(translate_persistence_error)?;
    let files: Vec<BidFileRow> = db
        .files_for_bid(bid_id)
        .map_err(translate_persistence_error)?;
    let events: Vec<AuditEvent> = db
        .audit_trail(bid_id)
        .map_err(translate_persistence_error)?;

    Ok(BidDetailResponse {
        summary: BidSummary::from_bid(&bid),
        checklist: vec![bid.checklist.point1.clone(), bid.checklist.point2.clone()],
        files: files
            .into_iter()
            .map(|row| FileInfo {
                file_name: row.file_name,
                stage_title: row.stage_title,
                kind: row.media_kind,
            })
            .collect(),
        audit: events.iter().map(audit_entry).collect(),
    })
}

fn audit_entry(event: &AuditEvent) -> AuditEntry {
    AuditEntry {
        action: event.action.as_str().to_string(),
        actor: describe_actor(&event.actor),
        before: event.before.as_str().to_string(),
        after: event.after.as_str().to_string(),
        details: event.details.clone(),
        occurred_at: event.occurred_at,
    }
}

fn describe_actor(actor: &Actor) -> String {
    actor.operator_id().map_or_else(
        || actor.kind().to_string(),
        |id| format!("{}:{id}", actor.kind()),
    )
}
