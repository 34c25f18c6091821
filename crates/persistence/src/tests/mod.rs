// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod bid_tests;
mod claim_tests;

use crate::Persistence;
use carbid_domain::{Bid, BidStatus};
use time::{Duration, OffsetDateTime};

pub fn create_test_db() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn seed_company(db: &mut Persistence) -> i64 {
    db.create_company("Sewa Motors", Some(-100_200)).unwrap()
}

pub fn seed_operator(db: &mut Persistence, operator_id: i64) {
    db.ensure_operator(operator_id, "Test Operator", "operator")
        .unwrap();
}

/// Creates an open bid that entered the pool `age_secs` seconds ago.
pub fn seed_open_bid(db: &mut Persistence, company_id: i64, age_secs: i64) -> i64 {
    let mut bid: Bid = Bid::new(company_id);
    bid.status = BidStatus::Open;
    bid.opened_at = Some(OffsetDateTime::now_utc() - Duration::seconds(age_secs));
    bid.vehicle.brand = Some(String::from("Toyota"));
    bid.vehicle.model = Some(String::from("Camry"));
    db.create_bid(&bid).unwrap()
}
