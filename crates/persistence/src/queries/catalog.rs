// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Company and dealer lookups.

use crate::data_models::{CompanyRow, DealerRow};
use crate::diesel_schema::{companies, dealers};
use crate::error::PersistenceError;
use diesel::prelude::*;

/// Fetch one company by id.
///
/// # Errors
///
/// Returns `PersistenceError::CompanyNotFound` if no such company
/// exists.
pub fn get_company(
    conn: &mut SqliteConnection,
    company_id: i64,
) -> Result<CompanyRow, PersistenceError> {
    let row: Option<CompanyRow> = companies::table
        .filter(companies::company_id.eq(company_id))
        .first::<CompanyRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_company: {e}")))?;
    row.ok_or(PersistenceError::CompanyNotFound(company_id))
}

/// Fetch one dealer by id.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if no such dealer exists.
pub fn get_dealer(
    conn: &mut SqliteConnection,
    dealer_id: i64,
) -> Result<DealerRow, PersistenceError> {
    let row: Option<DealerRow> = dealers::table
        .filter(dealers::dealer_id.eq(dealer_id))
        .first::<DealerRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_dealer: {e}")))?;
    row.ok_or_else(|| PersistenceError::NotFound(format!("dealer {dealer_id}")))
}

/// Fetch the dealers belonging to one company.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn dealers_for_company(
    conn: &mut SqliteConnection,
    company_id: i64,
) -> Result<Vec<DealerRow>, PersistenceError> {
    dealers::table
        .filter(dealers::company_id.eq(company_id))
        .order(dealers::dealer_id.asc())
        .load::<DealerRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("dealers_for_company: {e}")))
}
