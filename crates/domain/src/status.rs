// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Represents the lifecycle state of a bid.
///
/// Explicit lifecycle states govern what operations are permitted.
/// A bid is created parked (`Disabled` or `Ring`), becomes visible to
/// operators when `Open`, is worked in `Progress`, sits with a reviewer
/// in `Review`, and ends in the terminal `Done` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BidStatus {
    /// Initial parking state. Not visible to operators.
    #[default]
    Disabled,
    /// Alternate parking state used by the call-center deployment variant.
    /// Opens exactly like `Disabled`.
    Ring,
    /// Visible in the open pool. No manager assigned.
    Open,
    /// Claimed by exactly one operator; inspection in progress.
    Progress,
    /// Submitted material awaiting reviewer decision.
    Review,
    /// Approved and closed. Terminal.
    Done,
}

impl FromStr for BidStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "disabled" => Ok(Self::Disabled),
            "ring" => Ok(Self::Ring),
            "open" => Ok(Self::Open),
            "progress" => Ok(Self::Progress),
            "review" => Ok(Self::Review),
            "done" => Ok(Self::Done),
            _ => Err(DomainError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl BidStatus {
    /// Converts this status to its wire/storage representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Ring => "ring",
            Self::Open => "open",
            Self::Progress => "progress",
            Self::Review => "review",
            Self::Done => "done",
        }
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - `Disabled` → `Open` (admin opens)
    /// - `Ring` → `Open` (variant parking state, same rule)
    /// - `Open` → `Progress` (operator claims)
    /// - `Progress` → `Review` (checklist complete, material submitted)
    /// - `Review` → `Done` (reviewer approves)
    /// - `Review` → `Progress` (reviewer requests rework)
    /// - `Progress` → `Open` and `Review` → `Open` (operator declines)
    ///
    /// `Done` is terminal: no transition out of it is ever valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Disabled | Self::Ring, Self::Open)
                | (Self::Open, Self::Progress)
                | (Self::Progress, Self::Review | Self::Open)
                | (Self::Review, Self::Done | Self::Progress | Self::Open)
        )
    }

    /// Returns whether this is the terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns whether a bid in this status counts as actively held
    /// by its manager (the statuses that keep an operator "busy").
    #[must_use]
    pub const fn is_held_by_manager(&self) -> bool {
        matches!(self, Self::Progress | Self::Review)
    }

    /// Returns whether an operator may walk away from a bid in this status.
    ///
    /// Declining is permitted from `Progress` and `Review` only.
    #[must_use]
    pub const fn allows_decline(&self) -> bool {
        matches!(self, Self::Progress | Self::Review)
    }
}
