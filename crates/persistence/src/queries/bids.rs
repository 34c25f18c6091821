// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bid query operations.

use crate::data_models::BidRow;
use crate::diesel_schema::bids;
use crate::error::PersistenceError;
use carbid_domain::{Bid, BidStatus, OperatorId};
use diesel::prelude::*;

/// Fetch one bid by id.
///
/// # Errors
///
/// Returns `PersistenceError::BidNotFound` if no such bid exists.
pub fn get_bid(conn: &mut SqliteConnection, bid_id: i64) -> Result<Bid, PersistenceError> {
    let row: Option<BidRow> = bids::table
        .filter(bids::bid_id.eq(bid_id))
        .select(BidRow::as_select())
        .first::<BidRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_bid: {e}")))?;
    row.ok_or(PersistenceError::BidNotFound(bid_id))?.into_bid()
}

/// Fetch every bid in a given status, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn bids_with_status(
    conn: &mut SqliteConnection,
    status: BidStatus,
) -> Result<Vec<Bid>, PersistenceError> {
    let rows: Vec<BidRow> = bids::table
        .filter(bids::status.eq(status.as_str()))
        .order(bids::bid_id.asc())
        .select(BidRow::as_select())
        .load::<BidRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("bids_with_status: {e}")))?;
    rows.into_iter().map(BidRow::into_bid).collect()
}

/// Fetch the bids an operator can act on for one company: the open,
/// unclaimed pool plus whatever this operator already holds there.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn available_bids_for_company(
    conn: &mut SqliteConnection,
    company_id: i64,
    operator_id: OperatorId,
) -> Result<Vec<Bid>, PersistenceError> {
    let open_and_unclaimed = bids::status
        .eq(BidStatus::Open.as_str())
        .and(bids::manager_id.is_null());
    let held_here = bids::manager_id.eq(operator_id).and(bids::status.eq_any([
        BidStatus::Progress.as_str(),
        BidStatus::Review.as_str(),
    ]));
    let rows: Vec<BidRow> = bids::table
        .filter(bids::company_id.eq(company_id))
        .filter(open_and_unclaimed.or(held_here))
        .order(bids::bid_id.asc())
        .select(BidRow::as_select())
        .load::<BidRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("available_bids_for_company: {e}")))?;
    rows.into_iter().map(BidRow::into_bid).collect()
}

/// Fetch the bid an operator currently holds, if any.
///
/// A held bid is one in `Progress` or `Review` with this operator as
/// its manager. The manager invariant guarantees at most one.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn bid_held_by(
    conn: &mut SqliteConnection,
    operator_id: OperatorId,
) -> Result<Option<Bid>, PersistenceError> {
    let row: Option<BidRow> = bids::table
        .filter(bids::manager_id.eq(operator_id))
        .filter(bids::status.eq_any([
            BidStatus::Progress.as_str(),
            BidStatus::Review.as_str(),
        ]))
        .select(BidRow::as_select())
        .first::<BidRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("bid_held_by: {e}")))?;
    row.map(BidRow::into_bid).transpose()
}

/// Fetch open bids not yet announced, opened at or before the cutoff.
///
/// The cutoff is a storage-format timestamp; the fixed-width format
/// makes the text comparison chronological.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn open_unshown_before(
    conn: &mut SqliteConnection,
    cutoff: &str,
) -> Result<Vec<Bid>, PersistenceError> {
    let rows: Vec<BidRow> = bids::table
        .filter(bids::status.eq(BidStatus::Open.as_str()))
        .filter(bids::shown_to_notifier.eq(0))
        .filter(bids::opened_at.is_not_null())
        .filter(bids::opened_at.le(cutoff))
        .order(bids::opened_at.asc())
        .select(BidRow::as_select())
        .load::<BidRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("open_unshown_before: {e}")))?;
    rows.into_iter().map(BidRow::into_bid).collect()
}

/// Fetch the distinct operator ids currently holding a bid.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn active_manager_ids(conn: &mut SqliteConnection) -> Result<Vec<OperatorId>, PersistenceError> {
    let ids: Vec<Option<i64>> = bids::table
        .filter(bids::status.eq_any([
            BidStatus::Progress.as_str(),
            BidStatus::Review.as_str(),
        ]))
        .select(bids::manager_id)
        .distinct()
        .load::<Option<i64>>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("active_manager_ids: {e}")))?;
    Ok(ids.into_iter().flatten().collect())
}

/// Count the bids in a given status.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_with_status(
    conn: &mut SqliteConnection,
    status: BidStatus,
) -> Result<i64, PersistenceError> {
    bids::table
        .filter(bids::status.eq(status.as_str()))
        .count()
        .get_result::<i64>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("count_with_status: {e}")))
}
