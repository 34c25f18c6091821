// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bid mutation operations.

use crate::backend;
use crate::data_models::{BidUpdate, NewBid};
use crate::diesel_schema::bids;
use crate::error::PersistenceError;
use carbid_domain::{BidStatus, OperatorId};
use diesel::prelude::*;

/// Insert a new bid and return its assigned id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_bid(conn: &mut SqliteConnection, record: &NewBid) -> Result<i64, PersistenceError> {
    diesel::insert_into(bids::table)
        .values(record)
        .execute(conn)?;
    backend::get_last_insert_rowid(conn)
}

/// Apply a full-column update to one bid.
///
/// # Errors
///
/// Returns `PersistenceError::BidNotFound` if the bid does not exist.
pub fn update_bid(
    conn: &mut SqliteConnection,
    bid_id: i64,
    changes: &BidUpdate,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(bids::table.filter(bids::bid_id.eq(bid_id)))
        .set(changes)
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::BidNotFound(bid_id));
    }
    Ok(())
}

/// Atomically claim an open bid for an operator.
///
/// The claim is a single conditional update: it only matches while the
/// bid is still `Open` with no manager, so concurrent claimers cannot
/// both win. A zero row count means the race was lost (or the bid never
/// existed).
///
/// # Errors
///
/// Returns `PersistenceError::ClaimLost` when another operator already
/// holds the bid, or `PersistenceError::BidNotFound` when there is no
/// such bid at all.
pub fn claim_bid(
    conn: &mut SqliteConnection,
    bid_id: i64,
    operator_id: OperatorId,
    updated_at: &str,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        bids::table
            .filter(bids::bid_id.eq(bid_id))
            .filter(bids::status.eq(BidStatus::Open.as_str()))
            .filter(bids::manager_id.is_null()),
    )
    .set((
        bids::status.eq(BidStatus::Progress.as_str()),
        bids::manager_id.eq(operator_id),
        bids::updated_at.eq(updated_at),
    ))
    .execute(conn)?;

    if updated == 1 {
        return Ok(());
    }

    let exists: bool = bids::table
        .filter(bids::bid_id.eq(bid_id))
        .count()
        .get_result::<i64>(conn)?
        > 0;
    if exists {
        Err(PersistenceError::ClaimLost(bid_id))
    } else {
        Err(PersistenceError::BidNotFound(bid_id))
    }
}

/// Mark one bid as announced by the reminder scheduler.
///
/// # Errors
///
/// Returns `PersistenceError::BidNotFound` if the bid does not exist.
pub fn mark_shown(
    conn: &mut SqliteConnection,
    bid_id: i64,
    updated_at: &str,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(bids::table.filter(bids::bid_id.eq(bid_id)))
        .set((
            bids::shown_to_notifier.eq(1),
            bids::updated_at.eq(updated_at),
        ))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::BidNotFound(bid_id));
    }
    Ok(())
}
