// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::diesel_schema::{audit_events, bid_files, bids, companies, dealers, operators};
use crate::error::PersistenceError;
use carbid_audit::{Action, Actor, AuditEvent};
use carbid_domain::{Bid, BidStatus, ChecklistAnswers, VehicleInfo};
use diesel::prelude::*;
use std::str::FromStr;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Storage timestamp format. Fixed-width UTC so that lexicographic
/// comparison of the stored text matches chronological order.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Formats a timestamp for storage.
///
/// # Errors
///
/// Returns an error if the value cannot be rendered in the storage format.
pub fn format_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .to_offset(UtcOffset::UTC)
        .format(TIMESTAMP_FORMAT)
        .map_err(|e| PersistenceError::CorruptRow {
            table: "bids",
            message: format!("unformattable timestamp: {e}"),
        })
}

/// Parses a storage timestamp back into an `OffsetDateTime`.
///
/// # Errors
///
/// Returns an error if the text is not in the storage format.
pub fn parse_timestamp(text: &str, table: &'static str) -> Result<OffsetDateTime, PersistenceError> {
    PrimitiveDateTime::parse(text, TIMESTAMP_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|e| PersistenceError::CorruptRow {
            table,
            message: format!("bad timestamp {text:?}: {e}"),
        })
}

/// The bid columns the domain type is built from. The row-audit
/// timestamps (`created_at`, `updated_at`) stay in storage only.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = bids)]
pub struct BidRow {
    pub bid_id: i64,
    pub company_id: i64,
    pub dealer_id: Option<i64>,
    pub status: String,
    pub manager_id: Option<i64>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<i32>,
    pub power: Option<i32>,
    pub source_url: Option<String>,
    pub opened_at: Option<String>,
    pub arrived_at: Option<String>,
    pub point1: Option<String>,
    pub point2: Option<String>,
    pub shown_to_notifier: i32,
    pub thread_id: Option<i64>,
}

impl BidRow {
    /// Converts a stored row into the domain type.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRow` if the status or a
    /// timestamp cannot be parsed.
    pub fn into_bid(self) -> Result<Bid, PersistenceError> {
        let status: BidStatus =
            BidStatus::from_str(&self.status).map_err(|e| PersistenceError::CorruptRow {
                table: "bids",
                message: e.to_string(),
            })?;
        let opened_at: Option<OffsetDateTime> = self
            .opened_at
            .as_deref()
            .map(|t| parse_timestamp(t, "bids"))
            .transpose()?;
        let arrived_at: Option<OffsetDateTime> = self
            .arrived_at
            .as_deref()
            .map(|t| parse_timestamp(t, "bids"))
            .transpose()?;

        Ok(Bid {
            bid_id: Some(self.bid_id),
            status,
            manager_id: self.manager_id,
            company_id: self.company_id,
            dealer_id: self.dealer_id,
            vehicle: VehicleInfo {
                brand: self.brand,
                model: self.model,
                year: self.year,
                mileage: self.mileage,
                power: self.power,
            },
            source_url: self.source_url,
            opened_at,
            arrived_at,
            checklist: ChecklistAnswers {
                point1: self.point1,
                point2: self.point2,
            },
            shown_to_notifier: self.shown_to_notifier != 0,
            thread_id: self.thread_id,
        })
    }
}

/// Insertable form of a new bid.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bids)]
pub struct NewBid {
    pub company_id: i64,
    pub dealer_id: Option<i64>,
    pub status: String,
    pub manager_id: Option<i64>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<i32>,
    pub power: Option<i32>,
    pub source_url: Option<String>,
    pub opened_at: Option<String>,
    pub arrived_at: Option<String>,
    pub point1: Option<String>,
    pub point2: Option<String>,
    pub shown_to_notifier: i32,
    pub thread_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl NewBid {
    /// Builds an insertable row from a domain bid.
    ///
    /// # Errors
    ///
    /// Returns an error if a timestamp cannot be formatted.
    pub fn from_bid(bid: &Bid, now: OffsetDateTime) -> Result<Self, PersistenceError> {
        let stamp: String = format_timestamp(now)?;
        Ok(Self {
            company_id: bid.company_id,
            dealer_id: bid.dealer_id,
            status: bid.status.as_str().to_string(),
            manager_id: bid.manager_id,
            brand: bid.vehicle.brand.clone(),
            model: bid.vehicle.model.clone(),
            year: bid.vehicle.year,
            mileage: bid.vehicle.mileage,
            power: bid.vehicle.power,
            source_url: bid.source_url.clone(),
            opened_at: bid.opened_at.map(format_timestamp).transpose()?,
            arrived_at: bid.arrived_at.map(format_timestamp).transpose()?,
            point1: bid.checklist.point1.clone(),
            point2: bid.checklist.point2.clone(),
            shown_to_notifier: i32::from(bid.shown_to_notifier),
            thread_id: bid.thread_id,
            created_at: stamp.clone(),
            updated_at: stamp,
        })
    }
}

/// Changeset applied when persisting a transition result.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = bids)]
#[diesel(treat_none_as_null = true)]
pub struct BidUpdate {
    pub status: String,
    pub manager_id: Option<i64>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub mileage: Option<i32>,
    pub power: Option<i32>,
    pub source_url: Option<String>,
    pub opened_at: Option<String>,
    pub arrived_at: Option<String>,
    pub point1: Option<String>,
    pub point2: Option<String>,
    pub shown_to_notifier: i32,
    pub thread_id: Option<i64>,
    pub updated_at: String,
}

impl BidUpdate {
    /// Builds a changeset carrying every mutable bid column.
    ///
    /// # Errors
    ///
    /// Returns an error if a timestamp cannot be formatted.
    pub fn from_bid(bid: &Bid, now: OffsetDateTime) -> Result<Self, PersistenceError> {
        Ok(Self {
            status: bid.status.as_str().to_string(),
            manager_id: bid.manager_id,
            brand: bid.vehicle.brand.clone(),
            model: bid.vehicle.model.clone(),
            year: bid.vehicle.year,
            mileage: bid.vehicle.mileage,
            power: bid.vehicle.power,
            source_url: bid.source_url.clone(),
            opened_at: bid.opened_at.map(format_timestamp).transpose()?,
            arrived_at: bid.arrived_at.map(format_timestamp).transpose()?,
            point1: bid.checklist.point1.clone(),
            point2: bid.checklist.point2.clone(),
            shown_to_notifier: i32::from(bid.shown_to_notifier),
            thread_id: bid.thread_id,
            updated_at: format_timestamp(now)?,
        })
    }
}

/// A stored audit event row.
#[derive(Debug, Clone, Queryable)]
pub struct AuditEventRow {
    pub event_id: i64,
    pub bid_id: i64,
    pub actor_kind: String,
    pub actor_operator_id: Option<i64>,
    pub action: String,
    pub before_status: String,
    pub after_status: String,
    pub details: Option<String>,
    pub created_at: String,
}

impl AuditEventRow {
    /// Converts a stored row into the audit type.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CorruptRow` if any stored field cannot
    /// be mapped back.
    pub fn into_event(self) -> Result<AuditEvent, PersistenceError> {
        let corrupt = |message: String| PersistenceError::CorruptRow {
            table: "audit_events",
            message,
        };

        let actor: Actor = match (self.actor_kind.as_str(), self.actor_operator_id) {
            ("operator", Some(id)) => Actor::Operator(id),
            ("reviewer", Some(id)) => Actor::Reviewer(id),
            ("intake", None) => Actor::Intake,
            ("scheduler", None) => Actor::Scheduler,
            (kind, id) => {
                return Err(corrupt(format!("actor kind {kind:?} with operator {id:?}")));
            }
        };
        let action: Action = match self.action.as_str() {
            "open_bid" => Action::OpenBid,
            "claim_bid" => Action::ClaimBid,
            "save_arrival" => Action::SaveArrival,
            "submit_for_review" => Action::SubmitForReview,
            "approve_bid" => Action::ApproveBid,
            "request_rework" => Action::RequestRework,
            "decline_bid" => Action::DeclineBid,
            other => return Err(corrupt(format!("unknown action {other:?}"))),
        };
        let before: BidStatus =
            BidStatus::from_str(&self.before_status).map_err(|e| corrupt(e.to_string()))?;
        let after: BidStatus =
            BidStatus::from_str(&self.after_status).map_err(|e| corrupt(e.to_string()))?;
        let occurred_at: OffsetDateTime = parse_timestamp(&self.created_at, "audit_events")?;

        Ok(AuditEvent {
            event_id: Some(self.event_id),
            bid_id: self.bid_id,
            actor,
            action,
            before,
            after,
            details: self.details,
            occurred_at,
        })
    }
}

/// Insertable form of an audit event.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = audit_events)]
pub struct NewAuditEvent {
    pub bid_id: i64,
    pub actor_kind: String,
    pub actor_operator_id: Option<i64>,
    pub action: String,
    pub before_status: String,
    pub after_status: String,
    pub details: Option<String>,
    pub created_at: String,
}

impl NewAuditEvent {
    /// Builds an insertable row from an audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the timestamp cannot be formatted.
    pub fn from_event(event: &AuditEvent) -> Result<Self, PersistenceError> {
        Ok(Self {
            bid_id: event.bid_id,
            actor_kind: event.actor.kind().to_string(),
            actor_operator_id: event.actor.operator_id(),
            action: event.action.as_str().to_string(),
            before_status: event.before.as_str().to_string(),
            after_status: event.after.as_str().to_string(),
            details: event.details.clone(),
            created_at: format_timestamp(event.occurred_at)?,
        })
    }
}

/// A stored operator row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct OperatorRow {
    pub operator_id: i64,
    pub display_name: String,
    pub role: String,
    pub created_at: String,
}

/// Insertable form of an operator.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = operators)]
pub struct NewOperator {
    pub operator_id: i64,
    pub display_name: String,
    pub role: String,
    pub created_at: String,
}

/// A stored company row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct CompanyRow {
    pub company_id: i64,
    pub name: String,
    pub group_chat_id: Option<i64>,
}

/// Insertable form of a company.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = companies)]
pub struct NewCompany {
    pub name: String,
    pub group_chat_id: Option<i64>,
}

/// A stored dealer row.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct DealerRow {
    pub dealer_id: i64,
    pub company_id: i64,
    pub name: String,
    pub address: Option<String>,
}

/// Insertable form of a dealer.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = dealers)]
pub struct NewDealer {
    pub company_id: i64,
    pub name: String,
    pub address: Option<String>,
}

/// A stored bid file record.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct BidFileRow {
    pub file_id: i64,
    pub bid_id: i64,
    pub stage_title: String,
    pub file_name: String,
    pub media_kind: String,
    pub recorded_at: String,
}

/// Insertable form of a bid file record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = bid_files)]
pub struct NewBidFile {
    pub bid_id: i64,
    pub stage_title: String,
    pub file_name: String,
    pub media_kind: String,
    pub recorded_at: String,
}
