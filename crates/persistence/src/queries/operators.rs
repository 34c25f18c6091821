// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator query operations.

use crate::data_models::OperatorRow;
use crate::diesel_schema::operators;
use crate::error::PersistenceError;
use carbid_domain::OperatorId;
use diesel::prelude::*;

/// Fetch one operator by id.
///
/// # Errors
///
/// Returns `PersistenceError::OperatorNotFound` if no such operator
/// exists.
pub fn get_operator(
    conn: &mut SqliteConnection,
    operator_id: OperatorId,
) -> Result<OperatorRow, PersistenceError> {
    let row: Option<OperatorRow> = operators::table
        .filter(operators::operator_id.eq(operator_id))
        .first::<OperatorRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_operator: {e}")))?;
    row.ok_or(PersistenceError::OperatorNotFound(operator_id))
}

/// Fetch every operator carrying a given role.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn operators_with_role(
    conn: &mut SqliteConnection,
    role: &str,
) -> Result<Vec<OperatorRow>, PersistenceError> {
    operators::table
        .filter(operators::role.eq(role))
        .order(operators::operator_id.asc())
        .load::<OperatorRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("operators_with_role: {e}")))
}

/// Fetch every known operator.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn all_operators(conn: &mut SqliteConnection) -> Result<Vec<OperatorRow>, PersistenceError> {
    operators::table
        .order(operators::operator_id.asc())
        .load::<OperatorRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("all_operators: {e}")))
}
