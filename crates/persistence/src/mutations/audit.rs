// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.

use crate::backend;
use crate::data_models::NewAuditEvent;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;
use carbid_audit::AuditEvent;
use diesel::prelude::*;

/// Insert one audit event and return its assigned id.
///
/// # Errors
///
/// Returns an error if the event cannot be serialized or inserted.
pub fn insert_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let record: NewAuditEvent = NewAuditEvent::from_event(event)?;
    diesel::insert_into(audit_events::table)
        .values(&record)
        .execute(conn)?;
    backend::get_last_insert_rowid(conn)
}
