// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response DTOs for the operation boundary.
//!
//! These are distinct from domain types and represent the contract the
//! server exposes; domain types never cross this boundary directly.

use carbid_domain::{Bid, OperatorId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Request to create a new bid at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBidRequest {
    /// The company the inspection is performed for.
    pub company_id: i64,
    /// The dealer the vehicle sits at, if known.
    #[serde(default)]
    pub dealer_id: Option<i64>,
    /// Vehicle brand.
    #[serde(default)]
    pub brand: Option<String>,
    /// Vehicle model.
    #[serde(default)]
    pub model: Option<String>,
    /// Model year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Mileage in kilometers.
    #[serde(default)]
    pub mileage: Option<i32>,
    /// Engine power in horsepower.
    #[serde(default)]
    pub power: Option<i32>,
    /// Listing URL the bid was created from.
    #[serde(default)]
    pub source_url: Option<String>,
    /// External chat thread binding, if one exists.
    #[serde(default)]
    pub thread_id: Option<i64>,
    /// Open the bid to operators immediately instead of parking it.
    #[serde(default)]
    pub open_immediately: bool,
}

/// Response for a created bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateBidResponse {
    /// The assigned bid id.
    pub bid_id: i64,
    /// The bid's status after creation.
    pub status: String,
    /// A success message.
    pub message: String,
}

/// Request to claim an open bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimBidRequest {
    /// The operator taking the bid.
    pub operator_id: OperatorId,
}

/// Response for a successful claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimBidResponse {
    /// The claimed bid.
    pub bid_id: i64,
    /// The operator now holding it.
    pub operator_id: OperatorId,
    /// The wizard step now waiting on input.
    pub step: String,
}

/// The operator's answer to the on-site precheck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecheckRequest {
    /// The operator answering.
    pub operator_id: OperatorId,
    /// Whether the operator is already at the dealer.
    pub on_site: bool,
}

/// Request to park the wizard behind a consultation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultRequest {
    /// The operator asking for a consultation.
    pub operator_id: OperatorId,
}

/// A reviewer's resolution of a pending consultation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultResolveRequest {
    /// The reviewer resolving the consultation.
    pub reviewer_id: i64,
    /// The reviewer's answer, forwarded to the waiting operator.
    #[serde(default)]
    pub note: Option<String>,
}

/// Outcome of a consultation resolution.
///
/// `resolved` is false when nobody was waiting, which is how a
/// resolution that lost the race reports itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsultResolveResponse {
    /// The bid the consultation belonged to.
    pub bid_id: i64,
    /// Whether a waiting session was actually resolved.
    pub resolved: bool,
    /// The wizard step the session moved to, when one was resolved.
    pub step: Option<String>,
}

/// A typed arrival time for a deferred precheck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrivalRequest {
    /// The operator committing to the time.
    pub operator_id: OperatorId,
    /// When the operator will be at the dealer.
    #[serde(with = "time::serde::rfc3339")]
    pub arrived_at: OffsetDateTime,
}

/// Generic response carrying the wizard step now waiting on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WizardStepResponse {
    /// The bid the session belongs to.
    pub bid_id: i64,
    /// The wizard step now waiting on input.
    pub step: String,
}

/// Response for one stored stage file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFileResponse {
    /// The canonical name the file was stored under.
    pub file_name: String,
    /// The stage bucket it landed in.
    pub stage_title: String,
    /// Classified media kind.
    pub kind: String,
}

/// Response for a batch store: every file is attempted, failures are
/// reported alongside what landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStoreResponse {
    /// Files that landed.
    pub stored: Vec<StoredFileResponse>,
    /// Files that did not, with the reason.
    pub failed: Vec<FailedFile>,
}

/// One file that could not be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    /// The original file name.
    pub file_name: String,
    /// Why it was rejected.
    pub reason: String,
}

/// Request to finish the current photo stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteStageRequest {
    /// The operator finishing the stage.
    pub operator_id: OperatorId,
}

/// One checklist answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistAnswerRequest {
    /// The operator answering.
    pub operator_id: OperatorId,
    /// The 1-based question index.
    pub question: u8,
    /// The short answer code.
    pub answer: String,
}

/// Request to submit the collected material for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// The operator submitting.
    pub operator_id: OperatorId,
}

/// Request to send a reviewed bid back for more material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReworkRequest {
    /// The reviewer issuing the decision.
    pub reviewer_id: OperatorId,
    /// Note explaining what is missing.
    #[serde(default)]
    pub note: Option<String>,
}

/// Request to approve a reviewed bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveRequest {
    /// The reviewer issuing the decision.
    pub reviewer_id: OperatorId,
}

/// Request to give a held bid up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclineRequest {
    /// The operator walking away.
    pub operator_id: OperatorId,
    /// Why, if the operator said.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Response for a lifecycle decision on one bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidStatusResponse {
    /// The bid.
    pub bid_id: i64,
    /// Its status after the operation.
    pub status: String,
}

/// One bid in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidSummary {
    /// The bid id.
    pub bid_id: i64,
    /// Current status.
    pub status: String,
    /// The company the inspection is for.
    pub company_id: i64,
    /// "Brand Model" display name.
    pub vehicle: String,
    /// The holding operator, if any.
    pub manager_id: Option<OperatorId>,
    /// When the bid entered the open pool, if it has.
    #[serde(with = "time::serde::rfc3339::option")]
    pub opened_at: Option<OffsetDateTime>,
}

impl BidSummary {
    /// Builds a summary from a persisted bid.
    #[must_use]
    pub fn from_bid(bid: &Bid) -> Self {
        Self {
            bid_id: bid.bid_id.unwrap_or_default(),
            status: bid.status.as_str().to_string(),
            company_id: bid.company_id,
            vehicle: bid.vehicle.display_name(),
            manager_id: bid.manager_id,
            opened_at: bid.opened_at,
        }
    }
}

/// One recorded file in a bid detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileInfo {
    /// The canonical stored name.
    pub file_name: String,
    /// The stage bucket.
    pub stage_title: String,
    /// Classified media kind.
    pub kind: String,
}

/// One audit trail entry in a bid detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The recorded action name.
    pub action: String,
    /// Who performed it.
    pub actor: String,
    /// Status before the action.
    pub before: String,
    /// Status after the action.
    pub after: String,
    /// Free-form detail, such as a rework note.
    pub details: Option<String>,
    /// When the action happened.
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

/// Full detail for one bid: summary, files, and audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidDetailResponse {
    /// The bid summary.
    pub summary: BidSummary,
    /// Checklist answers, if any were given.
    pub checklist: Vec<Option<String>>,
    /// Every recorded file.
    pub files: Vec<FileInfo>,
    /// The audit trail, oldest first.
    pub audit: Vec<AuditEntry>,
}
