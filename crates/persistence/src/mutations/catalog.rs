// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Company and dealer mutations.

use crate::backend;
use crate::data_models::{NewCompany, NewDealer};
use crate::diesel_schema::{companies, dealers};
use crate::error::PersistenceError;
use diesel::prelude::*;

/// Insert a company and return its assigned id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_company(
    conn: &mut SqliteConnection,
    record: &NewCompany,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(companies::table)
        .values(record)
        .execute(conn)?;
    backend::get_last_insert_rowid(conn)
}

/// Insert a dealer and return its assigned id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_dealer(
    conn: &mut SqliteConnection,
    record: &NewDealer,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(dealers::table)
        .values(record)
        .execute(conn)?;
    backend::get_last_insert_rowid(conn)
}
