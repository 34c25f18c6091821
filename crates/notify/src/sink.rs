// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::NotifyError;
use async_trait::async_trait;
use carbid_domain::OperatorId;

/// Where a notification goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// A field operator's direct chat.
    Operator(OperatorId),
    /// An administrator's direct chat.
    Admin(OperatorId),
    /// A company group chat.
    CompanyGroup(i64),
}

/// One rendered notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Where the message goes.
    pub recipient: Recipient,
    /// The rendered message text.
    pub text: String,
    /// Bid the transport may attach a claim action for, when the
    /// message invites the recipient to take it.
    pub claim_bid: Option<i64>,
}

impl Outbound {
    /// Creates an outbound message.
    #[must_use]
    pub const fn new(recipient: Recipient, text: String) -> Self {
        Self {
            recipient,
            text,
            claim_bid: None,
        }
    }

    /// Creates an outbound message carrying a claim action for a bid.
    #[must_use]
    pub const fn with_claim(recipient: Recipient, text: String, bid_id: i64) -> Self {
        Self {
            recipient,
            text,
            claim_bid: Some(bid_id),
        }
    }
}

/// Delivery seam between the dispatch logic and the chat transport.
///
/// The scheduler and the API layer produce [`Outbound`] values; the
/// server wires in a sink that actually talks to the transport. Tests
/// wire in a recording sink.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers one message.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError::DeliveryFailed` if the transport rejects
    /// the message. Failures are per-recipient: the caller keeps going.
    async fn deliver(&self, outbound: &Outbound) -> Result<(), NotifyError>;
}
