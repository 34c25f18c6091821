// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::bid::OperatorId;
use crate::status::BidStatus;

/// Errors produced by domain rule validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The given string is not a recognized bid status.
    InvalidStatus(String),
    /// The requested status transition is not permitted by the lifecycle.
    IllegalTransition { from: BidStatus, to: BidStatus },
    /// No bid exists with this id.
    BidNotFound(i64),
    /// The acting operator does not hold the bid.
    NotBidManager {
        bid_id: i64,
        operator_id: OperatorId,
    },
    /// Another operator claimed the bid first.
    AlreadyClaimed { bid_id: i64 },
    /// The bid has not been assigned an id by storage yet.
    UnpersistedBid,
    /// The manager assignment contradicts the status.
    ManagerStatusViolation { status: BidStatus, has_manager: bool },
    /// The checklist question index is out of range.
    InvalidChecklistIndex(u8),
    /// No stage exists at the given index in the plan.
    StageNotFound(usize),
    /// A required stage has no files recorded for it.
    StageIncomplete { stage_title: String },
    /// A stage plan must contain at least one stage.
    EmptyStagePlan,
    /// Two stage titles canonicalize to colliding filename prefixes.
    AmbiguousStagePrefix { first: String, second: String },
    /// The bid has reached the terminal status and accepts no changes.
    BidClosed(i64),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStatus(s) => {
                write!(f, "invalid bid status: {s}")
            }
            Self::IllegalTransition { from, to } => {
                write!(f, "illegal bid transition from {from} to {to}")
            }
            Self::BidNotFound(id) => {
                write!(f, "bid {id} not found")
            }
            Self::NotBidManager {
                bid_id,
                operator_id,
            } => {
                write!(f, "operator {operator_id} does not hold bid {bid_id}")
            }
            Self::AlreadyClaimed { bid_id } => {
                write!(f, "bid {bid_id} was already claimed by another operator")
            }
            Self::UnpersistedBid => {
                write!(f, "bid has not been persisted and has no id")
            }
            Self::ManagerStatusViolation {
                status,
                has_manager,
            } => {
                write!(
                    f,
                    "manager assignment violates status {status}: has_manager={has_manager}"
                )
            }
            Self::InvalidChecklistIndex(idx) => {
                write!(f, "checklist question index {idx} is out of range")
            }
            Self::StageNotFound(idx) => {
                write!(f, "no stage at index {idx} in the stage plan")
            }
            Self::StageIncomplete { stage_title } => {
                write!(f, "required stage \"{stage_title}\" has no files")
            }
            Self::EmptyStagePlan => {
                write!(f, "stage plan must contain at least one stage")
            }
            Self::AmbiguousStagePrefix { first, second } => {
                write!(
                    f,
                    "stage titles {first:?} and {second:?} produce colliding filename prefixes"
                )
            }
            Self::BidClosed(id) => {
                write!(f, "bid {id} is closed and accepts no further changes")
            }
        }
    }
}

impl std::error::Error for DomainError {}
