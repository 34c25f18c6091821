// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the conditional claim.

use crate::{Persistence, PersistenceError};
use carbid_audit::{Action, Actor, AuditEvent};
use carbid_domain::{Bid, BidStatus};

use super::{create_test_db, seed_company, seed_open_bid, seed_operator};

#[test]
fn test_claim_assigns_manager_and_audits() {
    let mut db: Persistence = create_test_db();
    let company_id: i64 = seed_company(&mut db);
    seed_operator(&mut db, 42);
    let bid_id: i64 = seed_open_bid(&mut db, company_id, 0);

    let bid: Bid = db.claim_bid(bid_id, 42).unwrap();

    assert_eq!(bid.status, BidStatus::Progress);
    assert_eq!(bid.manager_id, Some(42));

    let trail: Vec<AuditEvent> = db.audit_trail(bid_id).unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].action, Action::ClaimBid);
    assert_eq!(trail[0].actor, Actor::Operator(42));
}

#[test]
fn test_second_claim_loses_the_race() {
    let mut db: Persistence = create_test_db();
    let company_id: i64 = seed_company(&mut db);
    seed_operator(&mut db, 42);
    seed_operator(&mut db, 43);
    let bid_id: i64 = seed_open_bid(&mut db, company_id, 0);

    db.claim_bid(bid_id, 42).unwrap();
    let result: Result<Bid, PersistenceError> = db.claim_bid(bid_id, 43);

    assert!(matches!(result, Err(PersistenceError::ClaimLost(id)) if id == bid_id));

    // The winner keeps the bid and no second claim event is written.
    let bid: Bid = db.get_bid(bid_id).unwrap();
    assert_eq!(bid.manager_id, Some(42));
    assert_eq!(db.audit_trail(bid_id).unwrap().len(), 1);
}

#[test]
fn test_claim_missing_bid_is_not_found() {
    let mut db: Persistence = create_test_db();
    seed_operator(&mut db, 42);

    let result: Result<Bid, PersistenceError> = db.claim_bid(999, 42);

    assert!(matches!(result, Err(PersistenceError::BidNotFound(999))));
}

#[test]
fn test_claim_parked_bid_is_rejected() {
    let mut db: Persistence = create_test_db();
    let company_id: i64 = seed_company(&mut db);
    seed_operator(&mut db, 42);
    let bid_id: i64 = db.create_bid(&Bid::new(company_id)).unwrap();

    let result: Result<Bid, PersistenceError> = db.claim_bid(bid_id, 42);

    assert!(matches!(result, Err(PersistenceError::ClaimLost(id)) if id == bid_id));
    assert_eq!(db.get_bid(bid_id).unwrap().status, BidStatus::Disabled);
}
