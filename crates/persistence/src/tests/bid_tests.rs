// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Persistence, PersistenceError};
use carbid::{Command, TransitionResult, apply};
use carbid_audit::{Action, Actor, AuditEvent};
use carbid_domain::{Bid, BidStatus};

use super::{create_test_db, seed_company, seed_open_bid, seed_operator};

#[test]
fn test_create_and_get_round_trips_all_fields() {
    let mut db: Persistence = create_test_db();
    let company_id: i64 = seed_company(&mut db);

    let mut bid: Bid = Bid::new(company_id);
    bid.vehicle.brand = Some(String::from("Toyota"));
    bid.vehicle.model = Some(String::from("Camry"));
    bid.vehicle.year = Some(2019);
    bid.vehicle.mileage = Some(84_000);
    bid.source_url = Some(String::from("https://example.com/listing/1"));
    bid.thread_id = Some(555);

    let bid_id: i64 = db.create_bid(&bid).unwrap();
    let loaded: Bid = db.get_bid(bid_id).unwrap();

    assert_eq!(loaded.bid_id, Some(bid_id));
    assert_eq!(loaded.status, BidStatus::Disabled);
    assert_eq!(loaded.company_id, company_id);
    assert_eq!(loaded.vehicle.brand.as_deref(), Some("Toyota"));
    assert_eq!(loaded.vehicle.year, Some(2019));
    assert_eq!(loaded.source_url.as_deref(), Some("https://example.com/listing/1"));
    assert_eq!(loaded.thread_id, Some(555));
    assert!(loaded.opened_at.is_none());
    assert!(!loaded.shown_to_notifier);
}

#[test]
fn test_get_missing_bid_is_not_found() {
    let mut db: Persistence = create_test_db();

    let result: Result<Bid, PersistenceError> = db.get_bid(999);

    assert!(matches!(result, Err(PersistenceError::BidNotFound(999))));
}

#[test]
fn test_persist_transition_updates_bid_and_writes_audit_event() {
    let mut db: Persistence = create_test_db();
    let company_id: i64 = seed_company(&mut db);

    let mut bid: Bid = Bid::new(company_id);
    let bid_id: i64 = db.create_bid(&bid).unwrap();
    bid.bid_id = Some(bid_id);

    let result: TransitionResult = apply(&bid, Command::OpenBid, Actor::Intake).unwrap();
    let event_id: i64 = db.persist_transition(&result).unwrap();
    assert!(event_id > 0);

    let loaded: Bid = db.get_bid(bid_id).unwrap();
    assert_eq!(loaded.status, BidStatus::Open);
    assert!(loaded.opened_at.is_some());

    let trail: Vec<AuditEvent> = db.audit_trail(bid_id).unwrap();
    assert_eq!(trail.len(), 1);
    assert_eq!(trail[0].event_id, Some(event_id));
    assert_eq!(trail[0].action, Action::OpenBid);
    assert_eq!(trail[0].actor, Actor::Intake);
    assert_eq!(trail[0].before, BidStatus::Disabled);
    assert_eq!(trail[0].after, BidStatus::Open);
}

#[test]
fn test_checklist_and_arrival_survive_round_trip() {
    let mut db: Persistence = create_test_db();
    let company_id: i64 = seed_company(&mut db);
    seed_operator(&mut db, 42);
    let bid_id: i64 = seed_open_bid(&mut db, company_id, 0);

    let mut bid: Bid = db.claim_bid(bid_id, 42).unwrap();
    bid.checklist
        .set_answer(1, String::from("good"))
        .unwrap();
    bid.checklist
        .set_answer(2, String::from("half_tank"))
        .unwrap();

    let result: TransitionResult = apply(
        &bid,
        Command::SubmitForReview { operator_id: 42 },
        Actor::Operator(42),
    )
    .unwrap();
    db.persist_transition(&result).unwrap();

    let loaded: Bid = db.get_bid(bid_id).unwrap();
    assert_eq!(loaded.status, BidStatus::Review);
    assert_eq!(loaded.checklist.point1.as_deref(), Some("good"));
    assert_eq!(loaded.checklist.point2.as_deref(), Some("half_tank"));
}

#[test]
fn test_available_bids_excludes_claimed_and_other_companies() {
    let mut db: Persistence = create_test_db();
    let company_a: i64 = seed_company(&mut db);
    let company_b: i64 = db.create_company("Other Motors", None).unwrap();
    seed_operator(&mut db, 42);

    let open_a: i64 = seed_open_bid(&mut db, company_a, 0);
    let claimed_a: i64 = seed_open_bid(&mut db, company_a, 0);
    let open_b: i64 = seed_open_bid(&mut db, company_b, 0);
    db.claim_bid(claimed_a, 42).unwrap();

    // Operator 99 holds nothing: only the unclaimed pool shows.
    let available: Vec<Bid> = db.available_bids_for_company(company_a, 99).unwrap();
    assert_eq!(available.len(), 1);
    assert_eq!(available[0].bid_id, Some(open_a));

    let available_b: Vec<Bid> = db.available_bids_for_company(company_b, 99).unwrap();
    assert_eq!(available_b.len(), 1);
    assert_eq!(available_b[0].bid_id, Some(open_b));
}

#[test]
fn test_available_bids_includes_the_operators_own_in_flight_bid() {
    let mut db: Persistence = create_test_db();
    let company_id: i64 = seed_company(&mut db);
    seed_operator(&mut db, 42);
    seed_operator(&mut db, 43);

    let open_id: i64 = seed_open_bid(&mut db, company_id, 0);
    let held_id: i64 = seed_open_bid(&mut db, company_id, 0);
    db.claim_bid(held_id, 42).unwrap();

    let mine: Vec<Bid> = db.available_bids_for_company(company_id, 42).unwrap();
    let ids: Vec<Option<i64>> = mine.iter().map(|b| b.bid_id).collect();
    assert_eq!(ids, vec![Some(open_id), Some(held_id)]);

    // Another operator does not see 42's in-flight bid.
    let theirs: Vec<Bid> = db.available_bids_for_company(company_id, 43).unwrap();
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].bid_id, Some(open_id));
}

#[test]
fn test_bid_held_by_tracks_manager() {
    let mut db: Persistence = create_test_db();
    let company_id: i64 = seed_company(&mut db);
    seed_operator(&mut db, 42);
    let bid_id: i64 = seed_open_bid(&mut db, company_id, 0);

    assert!(db.bid_held_by(42).unwrap().is_none());

    db.claim_bid(bid_id, 42).unwrap();

    let held: Bid = db.bid_held_by(42).unwrap().unwrap();
    assert_eq!(held.bid_id, Some(bid_id));
    assert_eq!(held.status, BidStatus::Progress);
}

#[test]
fn test_counts_by_status() {
    let mut db: Persistence = create_test_db();
    let company_id: i64 = seed_company(&mut db);
    seed_open_bid(&mut db, company_id, 0);
    seed_open_bid(&mut db, company_id, 0);
    db.create_bid(&Bid::new(company_id)).unwrap();

    assert_eq!(db.count_with_status(BidStatus::Open).unwrap(), 2);
    assert_eq!(db.count_with_status(BidStatus::Disabled).unwrap(), 1);
    assert_eq!(db.count_with_status(BidStatus::Done).unwrap(), 0);

    let open: Vec<Bid> = db.bids_with_status(BidStatus::Open).unwrap();
    assert_eq!(open.len(), 2);
}

#[test]
fn test_file_records_round_trip() {
    let mut db: Persistence = create_test_db();
    let company_id: i64 = seed_company(&mut db);
    let bid_id: i64 = seed_open_bid(&mut db, company_id, 0);

    db.record_file(
        bid_id,
        "All vehicle photos and video",
        "All_vehicle_photos_and_video_101500_front.jpg",
        carbid_domain::MediaKind::Photo,
    )
    .unwrap();
    db.record_file(
        bid_id,
        "All vehicle photos and video",
        "All_vehicle_photos_and_video_101501_walk.mp4",
        carbid_domain::MediaKind::Video,
    )
    .unwrap();

    let files = db.files_for_bid(bid_id).unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].media_kind, "photo");
    assert_eq!(files[1].media_kind, "video");
    assert_eq!(
        db.count_files_for_stage(bid_id, "All vehicle photos and video")
            .unwrap(),
        2
    );
    assert_eq!(
        db.count_files_for_stage(bid_id, "Additional materials")
            .unwrap(),
        0
    );
}
