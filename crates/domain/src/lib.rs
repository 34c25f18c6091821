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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod bid;
mod error;
mod stage;
mod status;
mod validation;

#[cfg(test)]
mod tests;

pub use bid::{Bid, ChecklistAnswers, OperatorId, VehicleInfo};
pub use error::DomainError;
pub use stage::{
    ADDITIONAL_STAGE_TITLE, MediaKind, StageDescriptor, StagePlan, stage_prefix,
};
pub use status::BidStatus;
pub use validation::{validate_bid_ownership, validate_claimable, validate_stage_plan};
