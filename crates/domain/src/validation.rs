// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::bid::{Bid, OperatorId};
use crate::error::DomainError;
use crate::stage::{StagePlan, stage_prefix};
use crate::status::BidStatus;

/// Validates that the acting operator currently holds the bid.
///
/// Every mutation inside the wizard (arrival, uploads, checklist,
/// submission, decline) must pass this check first.
///
/// # Errors
///
/// Returns `DomainError::UnpersistedBid` if the bid has no id,
/// `DomainError::BidClosed` if the bid is terminal, or
/// `DomainError::NotBidManager` if the operator is not the holder.
pub fn validate_bid_ownership(bid: &Bid, operator_id: OperatorId) -> Result<(), DomainError> {
    let bid_id: i64 = bid.id()?;
    if bid.status.is_terminal() {
        return Err(DomainError::BidClosed(bid_id));
    }
    if bid.is_held_by(operator_id) {
        Ok(())
    } else {
        Err(DomainError::NotBidManager {
            bid_id,
            operator_id,
        })
    }
}

/// Validates that a bid can be claimed from the open pool.
///
/// This is an advisory check on an in-memory snapshot; the authoritative
/// claim is the conditional update in storage, which may still lose the
/// race and report `AlreadyClaimed`.
///
/// # Errors
///
/// Returns `DomainError::UnpersistedBid` if the bid has no id,
/// `DomainError::IllegalTransition` if the bid is not `Open`, or
/// `DomainError::AlreadyClaimed` if a manager is already assigned.
pub fn validate_claimable(bid: &Bid) -> Result<(), DomainError> {
    let bid_id: i64 = bid.id()?;
    if bid.status != BidStatus::Open {
        return Err(DomainError::IllegalTransition {
            from: bid.status,
            to: BidStatus::Progress,
        });
    }
    if bid.manager_id.is_some() {
        return Err(DomainError::AlreadyClaimed { bid_id });
    }
    Ok(())
}

/// Validates a stage plan loaded from configuration.
///
/// Stage membership of a stored file is recovered by matching
/// `<prefix>_` at the start of its name, so no canonical prefix may
/// equal or extend another; titles like "Engine" and "Engine bay"
/// would count each other's files.
///
/// # Errors
///
/// Returns `DomainError::EmptyStagePlan` if the plan has no stages, or
/// `DomainError::AmbiguousStagePrefix` if two titles collide.
pub fn validate_stage_plan(plan: &StagePlan) -> Result<(), DomainError> {
    if plan.is_empty() {
        return Err(DomainError::EmptyStagePlan);
    }
    let prefixes: Vec<String> = plan
        .stages
        .iter()
        .map(|stage| stage_prefix(&stage.title))
        .collect();
    for (i, a) in prefixes.iter().enumerate() {
        for (j, b) in prefixes.iter().enumerate().skip(i + 1) {
            if a == b || b.starts_with(&format!("{a}_")) || a.starts_with(&format!("{b}_")) {
                return Err(DomainError::AmbiguousStagePrefix {
                    first: plan.stages[i].title.clone(),
                    second: plan.stages[j].title.clone(),
                });
            }
        }
    }
    Ok(())
}
