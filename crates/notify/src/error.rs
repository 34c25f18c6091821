// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carbid_persistence::PersistenceError;

/// Errors from notification fan-out and scheduling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// The transport rejected a message for one recipient.
    DeliveryFailed {
        /// Description of the recipient.
        recipient: String,
        /// The transport's error text.
        message: String,
    },
    /// A storage operation failed.
    Persistence(PersistenceError),
}

impl std::fmt::Display for NotifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeliveryFailed { recipient, message } => {
                write!(f, "delivery to {recipient} failed: {message}")
            }
            Self::Persistence(err) => write!(f, "persistence error: {err}"),
        }
    }
}

impl std::error::Error for NotifyError {}

impl From<PersistenceError> for NotifyError {
    fn from(err: PersistenceError) -> Self {
        Self::Persistence(err)
    }
}
