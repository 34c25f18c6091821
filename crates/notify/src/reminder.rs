// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::NotifyError;
use crate::render::{render_digest, render_open_announcement};
use crate::roles::RoleDirectory;
use crate::sink::{NotificationSink, Outbound, Recipient};
use carbid_domain::{Bid, BidStatus, OperatorId};
use carbid_persistence::Persistence;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Timing knobs for the reminder scheduler.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// How often the scheduler wakes up.
    pub tick: Duration,
    /// How long a bid must sit open before it is announced.
    pub age_threshold: Duration,
    /// Send the admin digest every this many ticks.
    pub digest_every_ticks: u32,
    /// Pause between announcing consecutive bids.
    pub inter_bid_delay: Duration,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(10),
            age_threshold: Duration::from_secs(60),
            digest_every_ticks: 90,
            inter_bid_delay: Duration::from_secs(5),
        }
    }
}

/// Background announcer for bids sitting unclaimed in the open pool.
///
/// Every tick it finds open bids older than the age threshold that have
/// not been announced yet, fans each one out to every idle operator,
/// and only then marks the bid as shown. Operators currently holding a
/// bid are skipped so they are not spammed mid-inspection. Every
/// `digest_every_ticks` ticks the admins get a pool summary.
pub struct ReminderScheduler {
    db: Arc<Mutex<Persistence>>,
    roles: Arc<RoleDirectory>,
    sink: Arc<dyn NotificationSink>,
    config: ReminderConfig,
}

impl ReminderScheduler {
    /// Creates a scheduler.
    #[must_use]
    pub fn new(
        db: Arc<Mutex<Persistence>>,
        roles: Arc<RoleDirectory>,
        sink: Arc<dyn NotificationSink>,
        config: ReminderConfig,
    ) -> Self {
        Self {
            db,
            roles,
            sink,
            config,
        }
    }

    /// Runs the scheduler forever.
    ///
    /// Sweep and digest errors are logged and the loop keeps going; a
    /// bad tick must never kill the scheduler.
    pub async fn run(self) {
        let mut interval = tokio::time::interval(self.config.tick);
        let mut ticks_since_digest: u32 = 0;
        info!(
            tick_secs = self.config.tick.as_secs(),
            age_secs = self.config.age_threshold.as_secs(),
            "reminder scheduler started"
        );
        loop {
            interval.tick().await;
            ticks_since_digest += 1;

            match self.sweep_once().await {
                Ok(0) => debug!("sweep found nothing to announce"),
                Ok(announced) => info!(announced, "announced open bids"),
                Err(err) => warn!(error = %err, "sweep failed"),
            }

            if ticks_since_digest >= self.config.digest_every_ticks {
                ticks_since_digest = 0;
                if let Err(err) = self.send_digest().await {
                    warn!(error = %err, "digest failed");
                }
            }
        }
    }

    /// One sweep: announce every due bid to every idle operator.
    ///
    /// A bid is marked shown once its fan-out has been attempted for
    /// every recipient, whether or not any delivery landed. A sweep
    /// with no idle operator makes no attempt and leaves the pool
    /// untouched for the next sweep.
    ///
    /// # Returns
    ///
    /// The number of bids marked shown.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails; individual delivery failures
    /// are logged and do not abort the sweep.
    pub async fn sweep_once(&self) -> Result<usize, NotifyError> {
        let cutoff: OffsetDateTime = OffsetDateTime::now_utc() - self.config.age_threshold;
        let due: Vec<Bid> = {
            let mut db = self.db.lock().await;
            db.open_unshown_before(cutoff)?
        };
        if due.is_empty() {
            return Ok(0);
        }

        let idle: Vec<OperatorId> = self.idle_operators().await?;
        if idle.is_empty() {
            debug!("no idle operators; leaving bids unannounced");
            return Ok(0);
        }

        let mut announced: usize = 0;
        for (index, bid) in due.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.config.inter_bid_delay).await;
            }
            if self.announce_bid(bid, &idle).await? {
                announced += 1;
            }
        }
        Ok(announced)
    }

    /// Sends the open pool digest to every admin.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails; per-admin delivery failures
    /// are logged and skipped.
    pub async fn send_digest(&self) -> Result<(), NotifyError> {
        let open: Vec<Bid> = {
            let mut db = self.db.lock().await;
            db.bids_with_status(BidStatus::Open)?
        };
        let text: String = render_digest(&open);

        for admin in self.roles.admins().await? {
            let outbound: Outbound = Outbound::new(Recipient::Admin(admin), text.clone());
            if let Err(err) = self.sink.deliver(&outbound).await {
                warn!(admin, error = %err, "digest delivery failed");
            }
        }
        Ok(())
    }

    async fn announce_bid(
        &self,
        bid: &Bid,
        idle: &[OperatorId],
    ) -> Result<bool, NotifyError> {
        let Some(bid_id) = bid.bid_id else {
            return Ok(false);
        };

        let company_name: String = {
            let mut db = self.db.lock().await;
            db.get_company(bid.company_id)
                .map_or_else(|_| format!("company {}", bid.company_id), |c| c.name)
        };
        let text: String = render_open_announcement(bid, &company_name);

        let mut delivered: usize = 0;
        for operator in idle {
            let outbound: Outbound =
                Outbound::with_claim(Recipient::Operator(*operator), text.clone(), bid_id);
            match self.sink.deliver(&outbound).await {
                Ok(()) => delivered += 1,
                Err(err) => {
                    warn!(operator, bid_id, error = %err, "announcement delivery failed");
                }
            }
        }
        if delivered == 0 {
            warn!(bid_id, "announcement reached nobody");
        }

        // Once the fan-out has been attempted for every recipient the
        // bid counts as announced, delivered or not.
        let mut db = self.db.lock().await;
        db.mark_shown(bid_id)?;
        Ok(true)
    }

    async fn idle_operators(&self) -> Result<Vec<OperatorId>, NotifyError> {
        let all: Vec<OperatorId> = self.roles.operators().await?;
        let busy: Vec<OperatorId> = {
            let mut db = self.db.lock().await;
            db.active_manager_ids()?
        };
        Ok(all.into_iter().filter(|id| !busy.contains(id)).collect())
    }
}
