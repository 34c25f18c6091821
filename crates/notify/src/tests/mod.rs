// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod scheduler_tests;

use crate::error::NotifyError;
use crate::sink::{NotificationSink, Outbound, Recipient};
use async_trait::async_trait;
use carbid_domain::{Bid, BidStatus};
use carbid_persistence::Persistence;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;

pub fn create_test_db() -> Arc<Mutex<Persistence>> {
    Arc::new(Mutex::new(
        Persistence::new_in_memory().expect("in-memory database"),
    ))
}

pub async fn seed_company(db: &Arc<Mutex<Persistence>>) -> i64 {
    db.lock()
        .await
        .create_company("Sewa Motors", Some(-100_200))
        .unwrap()
}

pub async fn seed_operator(db: &Arc<Mutex<Persistence>>, operator_id: i64, role: &str) {
    db.lock()
        .await
        .ensure_operator(operator_id, "Test Operator", role)
        .unwrap();
}

/// Creates an open bid that entered the pool `age_secs` seconds ago.
pub async fn seed_open_bid(db: &Arc<Mutex<Persistence>>, company_id: i64, age_secs: i64) -> i64 {
    let mut bid: Bid = Bid::new(company_id);
    bid.status = BidStatus::Open;
    bid.opened_at = Some(OffsetDateTime::now_utc() - Duration::seconds(age_secs));
    bid.vehicle.brand = Some(String::from("Toyota"));
    bid.vehicle.model = Some(String::from("Camry"));
    db.lock().await.create_bid(&bid).unwrap()
}

/// A sink that keeps every message it is handed.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Outbound>>,
}

impl RecordingSink {
    pub async fn sent(&self) -> Vec<Outbound> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn deliver(&self, outbound: &Outbound) -> Result<(), NotifyError> {
        self.sent.lock().await.push(outbound.clone());
        Ok(())
    }
}

/// A sink that rejects messages for one recipient, or for everyone.
pub struct FailingSink {
    reject: Option<Recipient>,
    inner: RecordingSink,
}

impl FailingSink {
    pub fn rejecting(recipient: Recipient) -> Self {
        Self {
            reject: Some(recipient),
            inner: RecordingSink::default(),
        }
    }

    pub fn rejecting_all() -> Self {
        Self {
            reject: None,
            inner: RecordingSink::default(),
        }
    }

    pub async fn sent(&self) -> Vec<Outbound> {
        self.inner.sent().await
    }
}

#[async_trait]
impl NotificationSink for FailingSink {
    async fn deliver(&self, outbound: &Outbound) -> Result<(), NotifyError> {
        if self.reject.is_none() || self.reject == Some(outbound.recipient) {
            return Err(NotifyError::DeliveryFailed {
                recipient: format!("{:?}", outbound.recipient),
                message: String::from("transport unavailable"),
            });
        }
        self.inner.deliver(outbound).await
    }
}
