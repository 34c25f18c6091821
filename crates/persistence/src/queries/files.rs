// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bid file record queries.

use crate::data_models::BidFileRow;
use crate::diesel_schema::bid_files;
use crate::error::PersistenceError;
use diesel::prelude::*;

/// Fetch the file records for one bid, in record order.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn files_for_bid(
    conn: &mut SqliteConnection,
    bid_id: i64,
) -> Result<Vec<BidFileRow>, PersistenceError> {
    bid_files::table
        .filter(bid_files::bid_id.eq(bid_id))
        .order(bid_files::file_id.asc())
        .load::<BidFileRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("files_for_bid: {e}")))
}

/// Count the file records for one stage of a bid.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_for_stage(
    conn: &mut SqliteConnection,
    bid_id: i64,
    stage_title: &str,
) -> Result<i64, PersistenceError> {
    bid_files::table
        .filter(bid_files::bid_id.eq(bid_id))
        .filter(bid_files::stage_title.eq(stage_title))
        .count()
        .get_result::<i64>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("count_for_stage: {e}")))
}
