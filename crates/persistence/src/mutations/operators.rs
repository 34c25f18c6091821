// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator mutation operations.

use crate::data_models::NewOperator;
use crate::diesel_schema::operators;
use crate::error::PersistenceError;
use carbid_domain::OperatorId;
use diesel::prelude::*;

/// Insert an operator, or refresh their display name if already known.
///
/// Operator ids come from the chat transport, so the row is keyed on
/// the external id rather than an autoincrement.
///
/// # Errors
///
/// Returns an error if the upsert fails.
pub fn ensure_operator(
    conn: &mut SqliteConnection,
    record: &NewOperator,
) -> Result<(), PersistenceError> {
    diesel::insert_into(operators::table)
        .values(record)
        .on_conflict(operators::operator_id)
        .do_update()
        .set(operators::display_name.eq(&record.display_name))
        .execute(conn)?;
    Ok(())
}

/// Change an operator's role.
///
/// # Errors
///
/// Returns `PersistenceError::OperatorNotFound` if no such operator
/// exists.
pub fn set_role(
    conn: &mut SqliteConnection,
    operator_id: OperatorId,
    role: &str,
) -> Result<(), PersistenceError> {
    let updated: usize =
        diesel::update(operators::table.filter(operators::operator_id.eq(operator_id)))
            .set(operators::role.eq(role))
            .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::OperatorNotFound(operator_id));
    }
    Ok(())
}
