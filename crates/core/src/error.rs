// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carbid_domain::{DomainError, OperatorId};

/// Errors that can occur during state transitions and wizard tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A domain rule was violated.
    DomainViolation(DomainError),
    /// Submission was attempted before every checklist question was answered.
    ChecklistIncomplete {
        /// The bid whose checklist is unfinished.
        bid_id: i64,
    },
    /// The operator has no wizard session in flight.
    NoActiveSession(OperatorId),
    /// The operator already has a wizard session for another bid.
    SessionAlreadyActive {
        /// The operator with the existing session.
        operator_id: OperatorId,
        /// The bid the existing session belongs to.
        bid_id: i64,
    },
    /// The requested step does not match the session's current state.
    UnexpectedStep {
        /// The operator whose session rejected the step.
        operator_id: OperatorId,
        /// The step the session is actually waiting on.
        expected: &'static str,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DomainViolation(err) => write!(f, "Domain violation: {err}"),
            Self::ChecklistIncomplete { bid_id } => {
                write!(f, "Checklist for bid {bid_id} is not complete")
            }
            Self::NoActiveSession(operator_id) => {
                write!(f, "Operator {operator_id} has no active wizard session")
            }
            Self::SessionAlreadyActive {
                operator_id,
                bid_id,
            } => {
                write!(
                    f,
                    "Operator {operator_id} already has a session for bid {bid_id}"
                )
            }
            Self::UnexpectedStep {
                operator_id,
                expected,
            } => {
                write!(
                    f,
                    "Session for operator {operator_id} is waiting on {expected}"
                )
            }
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::DomainViolation(err)
    }
}
