// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bid file record mutations.

use crate::backend;
use crate::data_models::NewBidFile;
use crate::diesel_schema::bid_files;
use crate::error::PersistenceError;
use diesel::prelude::*;

/// Record one stored file against a bid and return the record id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_file_record(
    conn: &mut SqliteConnection,
    record: &NewBidFile,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(bid_files::table)
        .values(record)
        .execute(conn)?;
    backend::get_last_insert_rowid(conn)
}
