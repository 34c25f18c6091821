// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use crate::data_models::AuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;
use carbid_audit::AuditEvent;
use diesel::prelude::*;

/// Fetch the audit trail for one bid, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn events_for_bid(
    conn: &mut SqliteConnection,
    bid_id: i64,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::bid_id.eq(bid_id))
        .order(audit_events::event_id.asc())
        .load::<AuditEventRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("events_for_bid: {e}")))?;
    rows.into_iter().map(AuditEventRow::into_event).collect()
}
