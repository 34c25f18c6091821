// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use carbid_domain::{BidStatus, OperatorId};
use time::OffsetDateTime;

#[cfg(test)]
mod tests;

/// Represents the entity performing a lifecycle action on a bid.
///
/// An actor is any identifiable entity that initiates a state change:
/// an operator in the field, a reviewer, the intake pipeline, or the
/// reminder scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    /// An operator acting through the wizard.
    Operator(OperatorId),
    /// A reviewer deciding on submitted material.
    Reviewer(OperatorId),
    /// The intake pipeline creating or opening bids.
    Intake,
    /// The background reminder scheduler.
    Scheduler,
}

impl Actor {
    /// The actor kind as a storage string.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Operator(_) => "operator",
            Self::Reviewer(_) => "reviewer",
            Self::Intake => "intake",
            Self::Scheduler => "scheduler",
        }
    }

    /// The acting operator id, if the actor is a person.
    #[must_use]
    pub const fn operator_id(&self) -> Option<OperatorId> {
        match self {
            Self::Operator(id) | Self::Reviewer(id) => Some(*id),
            Self::Intake | Self::Scheduler => None,
        }
    }
}

/// Represents the specific lifecycle action performed on a bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// A parked bid was made visible to operators.
    OpenBid,
    /// An operator claimed the bid from the open pool.
    ClaimBid,
    /// The operator committed to an arrival time.
    SaveArrival,
    /// Collected material was submitted for review.
    SubmitForReview,
    /// The reviewer approved and closed the bid.
    ApproveBid,
    /// The reviewer sent the bid back for additional material.
    RequestRework,
    /// The operator walked away and the bid returned to the pool.
    DeclineBid,
}

impl Action {
    /// The action name as a storage string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OpenBid => "open_bid",
            Self::ClaimBid => "claim_bid",
            Self::SaveArrival => "save_arrival",
            Self::SubmitForReview => "submit_for_review",
            Self::ApproveBid => "approve_bid",
            Self::RequestRework => "request_rework",
            Self::DeclineBid => "decline_bid",
        }
    }
}

/// An immutable audit event representing one bid state transition.
///
/// Every successful lifecycle transition must produce exactly one audit
/// event. Events capture who acted, what they did, and the status on
/// both sides of the transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Database-assigned id, `None` until persisted.
    pub event_id: Option<i64>,
    /// The bid this event belongs to.
    pub bid_id: i64,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The action that was performed.
    pub action: Action,
    /// The status before the transition.
    pub before: BidStatus,
    /// The status after the transition.
    pub after: BidStatus,
    /// Optional free-form detail (e.g., a rework note).
    pub details: Option<String>,
    /// When the transition happened.
    pub occurred_at: OffsetDateTime,
}

impl AuditEvent {
    /// Creates a new unpersisted `AuditEvent` stamped with the current time.
    ///
    /// Once created, an audit event is immutable.
    #[must_use]
    pub fn new(
        bid_id: i64,
        actor: Actor,
        action: Action,
        before: BidStatus,
        after: BidStatus,
        details: Option<String>,
    ) -> Self {
        Self {
            event_id: None,
            bid_id,
            actor,
            action,
            before,
            after,
            details,
            occurred_at: OffsetDateTime::now_utc(),
        }
    }
}
