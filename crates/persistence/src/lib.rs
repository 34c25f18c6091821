// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the CarBid inspection dispatch system.
//!
//! This crate stores bids, their audit trail, operators, companies,
//! dealers, and per-bid file records. It is built on Diesel over
//! `SQLite`.
//!
//! ## Timestamps
//!
//! All timestamps are stored as fixed-width UTC text
//! (`YYYY-MM-DD HH:MM:SS`), so lexicographic comparison in SQL matches
//! chronological order. The reminder scheduler leans on this for its
//! age cutoff query.
//!
//! ## Testing
//!
//! Standard tests run against unique in-memory `SQLite` databases; no
//! external infrastructure is required.

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

use carbid::TransitionResult;
use carbid_audit::{Action, Actor, AuditEvent};
use carbid_domain::{Bid, BidStatus, MediaKind, OperatorId};
use diesel::prelude::*;
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID, so
/// tests are isolated without time-based collisions.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{BidFileRow, CompanyRow, DealerRow, OperatorRow};
pub use data_models::{format_timestamp, parse_timestamp};
pub use error::PersistenceError;

/// Persistence adapter for bids, audit events, and the supporting
/// catalog tables.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite`
    /// database.
    ///
    /// Each call receives a unique database instance via atomic counter,
    /// ensuring deterministic test isolation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let db_name: String = format!("memdb_test_{db_id}");
        let shared_memory_url: String = format!("file:{db_name}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::initialize_database(&shared_memory_url)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite`
    /// database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::initialize_database(path_str)?;
        backend::enable_wal_mode(&mut conn)?;
        backend::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        backend::verify_foreign_key_enforcement(&mut self.conn)
    }

    // ========================================================================
    // Bids
    // ========================================================================

    /// Inserts a new bid and returns its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_bid(&mut self, bid: &Bid) -> Result<i64, PersistenceError> {
        let record = data_models::NewBid::from_bid(bid, OffsetDateTime::now_utc())?;
        mutations::bids::insert_bid(&mut self.conn, &record)
    }

    /// Fetches one bid by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BidNotFound` if no such bid exists.
    pub fn get_bid(&mut self, bid_id: i64) -> Result<Bid, PersistenceError> {
        queries::bids::get_bid(&mut self.conn, bid_id)
    }

    /// Writes a bid's current field values back without touching the
    /// audit trail.
    ///
    /// Used for non-lifecycle edits such as checklist answers and
    /// vehicle detail enrichment; lifecycle changes go through
    /// [`Persistence::persist_transition`].
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BidNotFound` if the bid has no id or
    /// does not exist.
    pub fn save_bid(&mut self, bid: &Bid) -> Result<(), PersistenceError> {
        let bid_id: i64 = bid
            .bid_id
            .ok_or(PersistenceError::NotFound(String::from("bid id missing")))?;
        let changes = data_models::BidUpdate::from_bid(bid, OffsetDateTime::now_utc())?;
        mutations::bids::update_bid(&mut self.conn, bid_id, &changes)
    }

    /// Persists a transition result: the updated bid and its audit
    /// event land in one transaction.
    ///
    /// # Returns
    ///
    /// The event id assigned to the audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if the bid does not exist or the write fails.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<i64, PersistenceError> {
        let bid_id: i64 = result
            .new_bid
            .bid_id
            .ok_or(PersistenceError::NotFound(String::from("bid id missing")))?;
        let changes =
            data_models::BidUpdate::from_bid(&result.new_bid, OffsetDateTime::now_utc())?;

        self.conn.transaction::<i64, PersistenceError, _>(|conn| {
            mutations::bids::update_bid(conn, bid_id, &changes)?;
            mutations::audit::insert_audit_event(conn, &result.audit_event)
        })
    }

    /// Atomically claims an open bid for an operator and records the
    /// claim in the audit trail.
    ///
    /// The claim is a single conditional update, so two operators
    /// racing for the same bid cannot both win; the loser gets
    /// `PersistenceError::ClaimLost`.
    ///
    /// # Returns
    ///
    /// The bid as it stands after the claim.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ClaimLost` or
    /// `PersistenceError::BidNotFound`.
    pub fn claim_bid(
        &mut self,
        bid_id: i64,
        operator_id: OperatorId,
    ) -> Result<Bid, PersistenceError> {
        let now: OffsetDateTime = OffsetDateTime::now_utc();
        let stamp: String = format_timestamp(now)?;

        self.conn.transaction::<Bid, PersistenceError, _>(|conn| {
            mutations::bids::claim_bid(conn, bid_id, operator_id, &stamp)?;
            let event: AuditEvent = AuditEvent::new(
                bid_id,
                Actor::Operator(operator_id),
                Action::ClaimBid,
                BidStatus::Open,
                BidStatus::Progress,
                None,
            );
            mutations::audit::insert_audit_event(conn, &event)?;
            queries::bids::get_bid(conn, bid_id)
        })
    }

    /// Marks a bid as announced by the reminder scheduler.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::BidNotFound` if the bid does not
    /// exist.
    pub fn mark_shown(&mut self, bid_id: i64) -> Result<(), PersistenceError> {
        let stamp: String = format_timestamp(OffsetDateTime::now_utc())?;
        mutations::bids::mark_shown(&mut self.conn, bid_id, &stamp)
    }

    /// Fetches every bid in a given status, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn bids_with_status(&mut self, status: BidStatus) -> Result<Vec<Bid>, PersistenceError> {
        queries::bids::bids_with_status(&mut self.conn, status)
    }

    /// Fetches the bids an operator can act on for one company: the
    /// open, unclaimed pool plus whatever this operator already holds
    /// there.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn available_bids_for_company(
        &mut self,
        company_id: i64,
        operator_id: OperatorId,
    ) -> Result<Vec<Bid>, PersistenceError> {
        queries::bids::available_bids_for_company(&mut self.conn, company_id, operator_id)
    }

    /// Fetches the bid an operator currently holds, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn bid_held_by(
        &mut self,
        operator_id: OperatorId,
    ) -> Result<Option<Bid>, PersistenceError> {
        queries::bids::bid_held_by(&mut self.conn, operator_id)
    }

    /// Fetches open, not-yet-announced bids opened at or before the
    /// cutoff.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn open_unshown_before(
        &mut self,
        cutoff: OffsetDateTime,
    ) -> Result<Vec<Bid>, PersistenceError> {
        let cutoff_text: String = format_timestamp(cutoff)?;
        queries::bids::open_unshown_before(&mut self.conn, &cutoff_text)
    }

    /// Fetches the distinct ids of operators currently holding a bid.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn active_manager_ids(&mut self) -> Result<Vec<OperatorId>, PersistenceError> {
        queries::bids::active_manager_ids(&mut self.conn)
    }

    /// Counts the bids in a given status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_with_status(&mut self, status: BidStatus) -> Result<i64, PersistenceError> {
        queries::bids::count_with_status(&mut self.conn, status)
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Persists a standalone audit event and returns its id.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        mutations::audit::insert_audit_event(&mut self.conn, event)
    }

    /// Fetches the audit trail for one bid, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn audit_trail(&mut self, bid_id: i64) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit::events_for_bid(&mut self.conn, bid_id)
    }

    // ========================================================================
    // Operators
    // ========================================================================

    /// Inserts an operator, or refreshes their display name if already
    /// known.
    ///
    /// # Errors
    ///
    /// Returns an error if the upsert fails.
    pub fn ensure_operator(
        &mut self,
        operator_id: OperatorId,
        display_name: &str,
        role: &str,
    ) -> Result<(), PersistenceError> {
        let record = data_models::NewOperator {
            operator_id,
            display_name: display_name.to_string(),
            role: role.to_string(),
            created_at: format_timestamp(OffsetDateTime::now_utc())?,
        };
        mutations::operators::ensure_operator(&mut self.conn, &record)
    }

    /// Changes an operator's role.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::OperatorNotFound` if no such operator
    /// exists.
    pub fn set_operator_role(
        &mut self,
        operator_id: OperatorId,
        role: &str,
    ) -> Result<(), PersistenceError> {
        mutations::operators::set_role(&mut self.conn, operator_id, role)
    }

    /// Fetches one operator by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::OperatorNotFound` if no such operator
    /// exists.
    pub fn get_operator(
        &mut self,
        operator_id: OperatorId,
    ) -> Result<OperatorRow, PersistenceError> {
        queries::operators::get_operator(&mut self.conn, operator_id)
    }

    /// Fetches every operator carrying a given role.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn operators_with_role(&mut self, role: &str) -> Result<Vec<OperatorRow>, PersistenceError> {
        queries::operators::operators_with_role(&mut self.conn, role)
    }

    /// Fetches every known operator.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn all_operators(&mut self) -> Result<Vec<OperatorRow>, PersistenceError> {
        queries::operators::all_operators(&mut self.conn)
    }

    // ========================================================================
    // Companies & Dealers
    // ========================================================================

    /// Inserts a company and returns its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_company(
        &mut self,
        name: &str,
        group_chat_id: Option<i64>,
    ) -> Result<i64, PersistenceError> {
        let record = data_models::NewCompany {
            name: name.to_string(),
            group_chat_id,
        };
        mutations::catalog::insert_company(&mut self.conn, &record)
    }

    /// Fetches one company by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::CompanyNotFound` if no such company
    /// exists.
    pub fn get_company(&mut self, company_id: i64) -> Result<CompanyRow, PersistenceError> {
        queries::catalog::get_company(&mut self.conn, company_id)
    }

    /// Inserts a dealer and returns its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_dealer(
        &mut self,
        company_id: i64,
        name: &str,
        address: Option<&str>,
    ) -> Result<i64, PersistenceError> {
        let record = data_models::NewDealer {
            company_id,
            name: name.to_string(),
            address: address.map(ToString::to_string),
        };
        mutations::catalog::insert_dealer(&mut self.conn, &record)
    }

    /// Fetches one dealer by id.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if no such dealer exists.
    pub fn get_dealer(&mut self, dealer_id: i64) -> Result<DealerRow, PersistenceError> {
        queries::catalog::get_dealer(&mut self.conn, dealer_id)
    }

    /// Fetches the dealers belonging to one company.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn dealers_for_company(
        &mut self,
        company_id: i64,
    ) -> Result<Vec<DealerRow>, PersistenceError> {
        queries::catalog::dealers_for_company(&mut self.conn, company_id)
    }

    // ========================================================================
    // File records
    // ========================================================================

    /// Records a stored file against a bid and returns the record id.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn record_file(
        &mut self,
        bid_id: i64,
        stage_title: &str,
        file_name: &str,
        kind: MediaKind,
    ) -> Result<i64, PersistenceError> {
        let media_kind: &str = kind.as_str();
        let record = data_models::NewBidFile {
            bid_id,
            stage_title: stage_title.to_string(),
            file_name: file_name.to_string(),
            media_kind: media_kind.to_string(),
            recorded_at: format_timestamp(OffsetDateTime::now_utc())?,
        };
        mutations::files::insert_file_record(&mut self.conn, &record)
    }

    /// Fetches the file records for one bid, in record order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn files_for_bid(&mut self, bid_id: i64) -> Result<Vec<BidFileRow>, PersistenceError> {
        queries::files::files_for_bid(&mut self.conn, bid_id)
    }

    /// Counts the file records for one stage of a bid.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_files_for_stage(
        &mut self,
        bid_id: i64,
        stage_title: &str,
    ) -> Result<i64, PersistenceError> {
        queries::files::count_for_stage(&mut self.conn, bid_id, stage_title)
    }
}
