// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::NotifyError;
use carbid_domain::OperatorId;
use carbid_persistence::{OperatorRow, Persistence};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Default lifetime of a cached role snapshot.
pub const DEFAULT_ROLE_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Clone)]
struct RoleSnapshot {
    admins: Vec<OperatorId>,
    operators: Vec<OperatorId>,
    fetched_at: Instant,
}

/// Role lookups with a TTL cache.
///
/// Fan-out consults roles on every sweep; hitting storage each time is
/// wasteful and the data changes rarely. A snapshot is reused until its
/// TTL lapses, and role edits call [`RoleDirectory::invalidate`] to
/// take effect immediately.
pub struct RoleDirectory {
    db: Arc<Mutex<Persistence>>,
    ttl: Duration,
    cache: Mutex<Option<RoleSnapshot>>,
}

impl RoleDirectory {
    /// Creates a directory with the default TTL.
    #[must_use]
    pub fn new(db: Arc<Mutex<Persistence>>) -> Self {
        Self::with_ttl(db, DEFAULT_ROLE_TTL)
    }

    /// Creates a directory with an explicit TTL.
    #[must_use]
    pub fn with_ttl(db: Arc<Mutex<Persistence>>, ttl: Duration) -> Self {
        Self {
            db,
            ttl,
            cache: Mutex::new(None),
        }
    }

    /// The ids of all administrators.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot must be refreshed and the
    /// storage query fails.
    pub async fn admins(&self) -> Result<Vec<OperatorId>, NotifyError> {
        Ok(self.snapshot().await?.admins)
    }

    /// The ids of all field operators.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot must be refreshed and the
    /// storage query fails.
    pub async fn operators(&self) -> Result<Vec<OperatorId>, NotifyError> {
        Ok(self.snapshot().await?.operators)
    }

    /// Drops the cached snapshot so the next lookup refreshes.
    pub async fn invalidate(&self) {
        let mut cache = self.cache.lock().await;
        *cache = None;
    }

    async fn snapshot(&self) -> Result<RoleSnapshot, NotifyError> {
        let mut cache = self.cache.lock().await;
        if let Some(snapshot) = cache.as_ref() {
            if snapshot.fetched_at.elapsed() < self.ttl {
                return Ok(snapshot.clone());
            }
        }

        let (admins, operators) = {
            let mut db = self.db.lock().await;
            let admins: Vec<OperatorRow> = db.operators_with_role("admin")?;
            let operators: Vec<OperatorRow> = db.operators_with_role("operator")?;
            (admins, operators)
        };
        let snapshot: RoleSnapshot = RoleSnapshot {
            admins: admins.into_iter().map(|row| row.operator_id).collect(),
            operators: operators.into_iter().map(|row| row.operator_id).collect(),
            fetched_at: Instant::now(),
        };
        *cache = Some(snapshot.clone());
        Ok(snapshot)
    }
}
