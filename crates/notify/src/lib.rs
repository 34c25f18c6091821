// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Notification fan-out and the open-pool reminder scheduler.
//!
//! Everything here produces or delivers [`Outbound`] messages through
//! the [`NotificationSink`] seam; no transport specifics live in this
//! crate.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod reminder;
mod render;
mod roles;
mod sink;

#[cfg(test)]
mod tests;

pub use error::NotifyError;
pub use reminder::{ReminderConfig, ReminderScheduler};
pub use render::{
    render_digest, render_open_announcement, render_review_package, render_rework_notice,
};
pub use roles::RoleDirectory;
pub use sink::{NotificationSink, Outbound, Recipient};
