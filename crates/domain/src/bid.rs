// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::status::BidStatus;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifier of an operator (field inspector) or reviewer.
///
/// This is the chat-transport user id and is opaque to the domain.
pub type OperatorId = i64;

/// Descriptive vehicle fields carried by a bid.
///
/// All fields are optional: intake frequently creates a bid from nothing
/// but a listing URL, and enrichment fills these in later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleInfo {
    /// Vehicle brand (e.g., "Toyota").
    pub brand: Option<String>,
    /// Vehicle model (e.g., "Camry").
    pub model: Option<String>,
    /// Model year.
    pub year: Option<i32>,
    /// Mileage in kilometers.
    pub mileage: Option<i32>,
    /// Engine power in horsepower.
    pub power: Option<i32>,
}

impl VehicleInfo {
    /// Renders "Brand Model" for display, skipping absent parts.
    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.brand, &self.model) {
            (Some(b), Some(m)) => format!("{b} {m}"),
            (Some(b), None) => b.clone(),
            (None, Some(m)) => m.clone(),
            (None, None) => String::from("(vehicle)"),
        }
    }
}

/// Answers to the two-question inspection checklist.
///
/// Answers are free-form short codes (e.g., "good", "half_tank") and are
/// only meaningful once the bid has reached `Review`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistAnswers {
    /// Answer to question 1 (bumper condition).
    pub point1: Option<String>,
    /// Answer to question 2 (fuel level).
    pub point2: Option<String>,
}

impl ChecklistAnswers {
    /// Number of checklist questions.
    pub const QUESTION_COUNT: u8 = 2;

    /// Sets the answer for a 1-based question index.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidChecklistIndex` if the index is not
    /// 1 or 2.
    pub fn set_answer(&mut self, q_index: u8, code: String) -> Result<(), DomainError> {
        match q_index {
            1 => self.point1 = Some(code),
            2 => self.point2 = Some(code),
            other => return Err(DomainError::InvalidChecklistIndex(other)),
        }
        Ok(())
    }

    /// Returns whether any question has been answered.
    ///
    /// Used to detect that a bid already passed the checklist once (the
    /// rework re-entry signal).
    #[must_use]
    pub const fn any_answered(&self) -> bool {
        self.point1.is_some() || self.point2.is_some()
    }

    /// Returns whether every question has been answered.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.point1.is_some() && self.point2.is_some()
    }

    /// Clears all answers.
    pub fn reset(&mut self) {
        self.point1 = None;
        self.point2 = None;
    }
}

/// A bid: one vehicle-inspection work order moving through the lifecycle.
///
/// `bid_id` is the canonical identifier assigned by the persistence layer.
/// `None` indicates the bid has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    /// The canonical numeric identifier assigned by the database.
    pub bid_id: Option<i64>,
    /// Current lifecycle status.
    pub status: BidStatus,
    /// The operator currently holding this bid, if any.
    ///
    /// Invariant: at most one non-null manager at a time, and only while
    /// the status is `Progress` or `Review`.
    pub manager_id: Option<OperatorId>,
    /// The company this inspection is performed for.
    pub company_id: i64,
    /// The dealer the vehicle is located at, if known.
    pub dealer_id: Option<i64>,
    /// Descriptive vehicle fields.
    pub vehicle: VehicleInfo,
    /// Listing URL the bid was created from.
    pub source_url: Option<String>,
    /// Set exactly once, on the first transition into `Open`.
    pub opened_at: Option<OffsetDateTime>,
    /// Set when the operator commits to an arrival ETA.
    pub arrived_at: Option<OffsetDateTime>,
    /// Checklist answers, meaningful once the bid reaches `Review`.
    pub checklist: ChecklistAnswers,
    /// Reminder suppression marker: flips false→true once per open
    /// episode, reset on every transition back into `Open`.
    pub shown_to_notifier: bool,
    /// External chat thread/topic binding, if one was created at intake.
    pub thread_id: Option<i64>,
}

impl Bid {
    /// Creates a new unpersisted bid for a company in the default parking
    /// status.
    #[must_use]
    pub fn new(company_id: i64) -> Self {
        Self {
            bid_id: None,
            status: BidStatus::default(),
            manager_id: None,
            company_id,
            dealer_id: None,
            vehicle: VehicleInfo::default(),
            source_url: None,
            opened_at: None,
            arrived_at: None,
            checklist: ChecklistAnswers::default(),
            shown_to_notifier: false,
            thread_id: None,
        }
    }

    /// Returns the persisted id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnpersistedBid` if the bid has no id yet.
    pub fn id(&self) -> Result<i64, DomainError> {
        self.bid_id.ok_or(DomainError::UnpersistedBid)
    }

    /// Returns whether the given operator currently holds this bid.
    #[must_use]
    pub fn is_held_by(&self, operator_id: OperatorId) -> bool {
        self.manager_id == Some(operator_id) && self.status.is_held_by_manager()
    }

    /// Validates the manager/status invariant.
    ///
    /// A manager may only be assigned while the bid is `Progress` or
    /// `Review`; a bid in those statuses must have a manager.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ManagerStatusViolation` if the invariant does
    /// not hold.
    pub fn validate_manager_invariant(&self) -> Result<(), DomainError> {
        let held: bool = self.status.is_held_by_manager();
        if held == self.manager_id.is_some() {
            Ok(())
        } else {
            Err(DomainError::ManagerStatusViolation {
                status: self.status,
                has_manager: self.manager_id.is_some(),
            })
        }
    }
}
