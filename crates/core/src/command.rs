// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carbid_domain::OperatorId;
use time::OffsetDateTime;

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request bid state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Make a parked bid visible to operators.
    OpenBid,
    /// Claim an open bid for an operator.
    ClaimBid {
        /// The operator taking the bid.
        operator_id: OperatorId,
    },
    /// Record the operator's committed arrival time.
    SaveArrival {
        /// The operator holding the bid.
        operator_id: OperatorId,
        /// When the operator expects to be (or is) at the dealer.
        arrived_at: OffsetDateTime,
    },
    /// Submit collected material for review.
    SubmitForReview {
        /// The operator holding the bid.
        operator_id: OperatorId,
    },
    /// Approve the submission and close the bid.
    ApproveBid,
    /// Send the bid back to the holding operator for more material.
    RequestRework {
        /// Reviewer note explaining what is missing.
        note: Option<String>,
    },
    /// Operator walks away; the bid returns to the open pool.
    DeclineBid {
        /// The operator giving the bid up.
        operator_id: OperatorId,
        /// Why the operator walked away, if they said.
        reason: Option<String>,
    },
}
