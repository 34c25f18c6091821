// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use carbid_audit::{Action, Actor, AuditEvent};
use carbid_domain::{
    Bid, BidStatus, DomainError, validate_bid_ownership, validate_claimable,
};
use time::OffsetDateTime;

/// The outcome of a successfully applied command.
///
/// Every successful transition carries the updated bid and exactly one
/// audit event describing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The bid after the transition.
    pub new_bid: Bid,
    /// The audit event recording the transition.
    pub audit_event: AuditEvent,
}

/// Applies a command to a bid, producing the new bid and its audit event.
///
/// The input bid is never mutated. Callers persist the returned bid and
/// audit event together.
///
/// # Arguments
///
/// * `bid` - The current bid (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new bid and audit event
/// * `Err(CoreError)` if the command is invalid for the bid's state
///
/// # Errors
///
/// Returns an error if the command violates the lifecycle, the acting
/// operator does not hold the bid, or the checklist is incomplete at
/// submission time.
pub fn apply(bid: &Bid, command: Command, actor: Actor) -> Result<TransitionResult, CoreError> {
    let bid_id: i64 = bid.id().map_err(CoreError::DomainViolation)?;
    let before: BidStatus = bid.status;

    match command {
        Command::OpenBid => {
            check_transition(bid, BidStatus::Open)?;

            let mut new_bid: Bid = bid.clone();
            new_bid.status = BidStatus::Open;
            new_bid.manager_id = None;
            // Reminder suppression resets on every entry into the pool.
            new_bid.shown_to_notifier = false;
            if new_bid.opened_at.is_none() {
                new_bid.opened_at = Some(OffsetDateTime::now_utc());
            }

            let audit_event: AuditEvent = AuditEvent::new(
                bid_id,
                actor,
                Action::OpenBid,
                before,
                BidStatus::Open,
                None,
            );
            Ok(TransitionResult {
                new_bid,
                audit_event,
            })
        }
        Command::ClaimBid { operator_id } => {
            validate_claimable(bid)?;

            let mut new_bid: Bid = bid.clone();
            new_bid.status = BidStatus::Progress;
            new_bid.manager_id = Some(operator_id);

            let audit_event: AuditEvent = AuditEvent::new(
                bid_id,
                actor,
                Action::ClaimBid,
                before,
                BidStatus::Progress,
                None,
            );
            Ok(TransitionResult {
                new_bid,
                audit_event,
            })
        }
        Command::SaveArrival {
            operator_id,
            arrived_at,
        } => {
            validate_bid_ownership(bid, operator_id)?;

            let mut new_bid: Bid = bid.clone();
            new_bid.arrived_at = Some(arrived_at);

            // Not a status transition; audited with identical endpoints.
            let audit_event: AuditEvent = AuditEvent::new(
                bid_id,
                actor,
                Action::SaveArrival,
                before,
                before,
                None,
            );
            Ok(TransitionResult {
                new_bid,
                audit_event,
            })
        }
        Command::SubmitForReview { operator_id } => {
            validate_bid_ownership(bid, operator_id)?;
            check_transition(bid, BidStatus::Review)?;
            if !bid.checklist.is_complete() {
                return Err(CoreError::ChecklistIncomplete { bid_id });
            }

            let mut new_bid: Bid = bid.clone();
            new_bid.status = BidStatus::Review;

            let audit_event: AuditEvent = AuditEvent::new(
                bid_id,
                actor,
                Action::SubmitForReview,
                before,
                BidStatus::Review,
                None,
            );
            Ok(TransitionResult {
                new_bid,
                audit_event,
            })
        }
        Command::ApproveBid => {
            check_transition(bid, BidStatus::Done)?;

            let mut new_bid: Bid = bid.clone();
            new_bid.status = BidStatus::Done;
            new_bid.manager_id = None;

            let audit_event: AuditEvent = AuditEvent::new(
                bid_id,
                actor,
                Action::ApproveBid,
                before,
                BidStatus::Done,
                None,
            );
            Ok(TransitionResult {
                new_bid,
                audit_event,
            })
        }
        Command::RequestRework { note } => {
            check_transition(bid, BidStatus::Progress)?;

            // The holding operator keeps the bid through rework.
            let mut new_bid: Bid = bid.clone();
            new_bid.status = BidStatus::Progress;

            let audit_event: AuditEvent = AuditEvent::new(
                bid_id,
                actor,
                Action::RequestRework,
                before,
                BidStatus::Progress,
                note,
            );
            Ok(TransitionResult {
                new_bid,
                audit_event,
            })
        }
        Command::DeclineBid {
            operator_id,
            reason,
        } => {
            validate_bid_ownership(bid, operator_id)?;
            check_transition(bid, BidStatus::Open)?;

            // A bid returning to the pool carries no partial inspection
            // state from its previous holder.
            let mut new_bid: Bid = bid.clone();
            new_bid.status = BidStatus::Open;
            new_bid.manager_id = None;
            new_bid.shown_to_notifier = false;
            new_bid.arrived_at = None;
            new_bid.checklist.reset();

            let audit_event: AuditEvent = AuditEvent::new(
                bid_id,
                actor,
                Action::DeclineBid,
                before,
                BidStatus::Open,
                reason,
            );
            Ok(TransitionResult {
                new_bid,
                audit_event,
            })
        }
    }
}

fn check_transition(bid: &Bid, target: BidStatus) -> Result<(), CoreError> {
    if bid.status.can_transition_to(target) {
        Ok(())
    } else {
        Err(CoreError::DomainViolation(DomainError::IllegalTransition {
            from: bid.status,
            to: target,
        }))
    }
}
