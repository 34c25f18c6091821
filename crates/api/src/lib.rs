// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operation boundary for the CarBid dispatch system.
//!
//! Every state change goes through a function in this crate: requests
//! come in as DTOs, lifecycle changes run through the core `apply`
//! function and land in persistence, and the notifications an operation
//! produces are returned as [`carbid_notify::Outbound`] values for the
//! caller to deliver.

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

mod claim;
mod error;
mod intake;
mod queries;
mod request_response;
mod review;
mod wizard;

#[cfg(test)]
mod tests;

pub use claim::claim_bid;
pub use error::{
    ApiError, translate_core_error, translate_domain_error, translate_file_error,
    translate_persistence_error,
};
pub use intake::{create_bid, open_bid};
pub use queries::{available_for_company, bid_detail, held_bid, open_pool};
pub use request_response::{
    ApproveRequest, ArrivalRequest, AuditEntry, BatchStoreResponse, BidDetailResponse,
    BidStatusResponse, BidSummary, ChecklistAnswerRequest, ClaimBidRequest, ClaimBidResponse,
    CompleteStageRequest, ConsultRequest, ConsultResolveRequest, ConsultResolveResponse,
    CreateBidRequest, CreateBidResponse, DeclineRequest, FailedFile, FileInfo, PrecheckRequest,
    ReworkRequest, StoredFileResponse, SubmitRequest, WizardStepResponse,
};
pub use review::{approve, request_rework};
pub use wizard::{
    answer_checklist, complete_stage, decline, precheck, record_arrival, request_consult,
    resolve_consult, store_batch, store_file, submit,
};
