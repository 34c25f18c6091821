// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    ADDITIONAL_STAGE_TITLE, Bid, BidStatus, ChecklistAnswers, DomainError, MediaKind,
    StageDescriptor, StagePlan, VehicleInfo, stage_prefix,
};
use std::str::FromStr;

#[test]
fn test_status_round_trips_through_strings() {
    let all: [BidStatus; 6] = [
        BidStatus::Disabled,
        BidStatus::Ring,
        BidStatus::Open,
        BidStatus::Progress,
        BidStatus::Review,
        BidStatus::Done,
    ];
    for status in all {
        let parsed: BidStatus = BidStatus::from_str(status.as_str()).unwrap();
        assert_eq!(parsed, status);
    }
}

#[test]
fn test_status_rejects_unknown_string() {
    let result: Result<BidStatus, DomainError> = BidStatus::from_str("archived");
    assert!(matches!(result, Err(DomainError::InvalidStatus(_))));
}

#[test]
fn test_default_status_is_disabled() {
    assert_eq!(BidStatus::default(), BidStatus::Disabled);
}

#[test]
fn test_parking_states_open_identically() {
    assert!(BidStatus::Disabled.can_transition_to(BidStatus::Open));
    assert!(BidStatus::Ring.can_transition_to(BidStatus::Open));
    assert!(!BidStatus::Disabled.can_transition_to(BidStatus::Progress));
    assert!(!BidStatus::Ring.can_transition_to(BidStatus::Done));
}

#[test]
fn test_lifecycle_transitions() {
    assert!(BidStatus::Open.can_transition_to(BidStatus::Progress));
    assert!(BidStatus::Progress.can_transition_to(BidStatus::Review));
    assert!(BidStatus::Review.can_transition_to(BidStatus::Done));
    assert!(BidStatus::Review.can_transition_to(BidStatus::Progress));
    assert!(BidStatus::Progress.can_transition_to(BidStatus::Open));
    assert!(BidStatus::Review.can_transition_to(BidStatus::Open));
}

#[test]
fn test_done_is_terminal() {
    let all: [BidStatus; 6] = [
        BidStatus::Disabled,
        BidStatus::Ring,
        BidStatus::Open,
        BidStatus::Progress,
        BidStatus::Review,
        BidStatus::Done,
    ];
    for target in all {
        assert!(!BidStatus::Done.can_transition_to(target));
    }
    assert!(BidStatus::Done.is_terminal());
    assert!(!BidStatus::Review.is_terminal());
}

#[test]
fn test_open_cannot_skip_to_review_or_done() {
    assert!(!BidStatus::Open.can_transition_to(BidStatus::Review));
    assert!(!BidStatus::Open.can_transition_to(BidStatus::Done));
    assert!(!BidStatus::Progress.can_transition_to(BidStatus::Done));
}

#[test]
fn test_held_and_decline_statuses() {
    assert!(BidStatus::Progress.is_held_by_manager());
    assert!(BidStatus::Review.is_held_by_manager());
    assert!(!BidStatus::Open.is_held_by_manager());
    assert!(BidStatus::Progress.allows_decline());
    assert!(BidStatus::Review.allows_decline());
    assert!(!BidStatus::Done.allows_decline());
}

#[test]
fn test_new_bid_starts_parked_without_manager() {
    let bid: Bid = Bid::new(7);
    assert_eq!(bid.status, BidStatus::Disabled);
    assert!(bid.manager_id.is_none());
    assert!(bid.opened_at.is_none());
    assert!(!bid.shown_to_notifier);
    assert!(matches!(bid.id(), Err(DomainError::UnpersistedBid)));
}

#[test]
fn test_manager_invariant_holds_for_progress_with_manager() {
    let mut bid: Bid = Bid::new(7);
    bid.bid_id = Some(1);
    bid.status = BidStatus::Progress;
    bid.manager_id = Some(42);
    assert!(bid.validate_manager_invariant().is_ok());
    assert!(bid.is_held_by(42));
    assert!(!bid.is_held_by(43));
}

#[test]
fn test_manager_invariant_rejects_open_with_manager() {
    let mut bid: Bid = Bid::new(7);
    bid.bid_id = Some(1);
    bid.status = BidStatus::Open;
    bid.manager_id = Some(42);
    assert!(matches!(
        bid.validate_manager_invariant(),
        Err(DomainError::ManagerStatusViolation {
            status: BidStatus::Open,
            has_manager: true
        })
    ));
}

#[test]
fn test_manager_invariant_rejects_review_without_manager() {
    let mut bid: Bid = Bid::new(7);
    bid.bid_id = Some(1);
    bid.status = BidStatus::Review;
    assert!(matches!(
        bid.validate_manager_invariant(),
        Err(DomainError::ManagerStatusViolation {
            status: BidStatus::Review,
            has_manager: false
        })
    ));
}

#[test]
fn test_checklist_answers_by_index() {
    let mut answers: ChecklistAnswers = ChecklistAnswers::default();
    assert!(!answers.any_answered());

    answers.set_answer(1, String::from("good")).unwrap();
    assert!(answers.any_answered());
    assert!(!answers.is_complete());

    answers.set_answer(2, String::from("half_tank")).unwrap();
    assert!(answers.is_complete());

    answers.reset();
    assert!(!answers.any_answered());
}

#[test]
fn test_checklist_rejects_out_of_range_index() {
    let mut answers: ChecklistAnswers = ChecklistAnswers::default();
    let result: Result<(), DomainError> = answers.set_answer(3, String::from("good"));
    assert!(matches!(result, Err(DomainError::InvalidChecklistIndex(3))));
    assert!(matches!(
        answers.set_answer(0, String::from("good")),
        Err(DomainError::InvalidChecklistIndex(0))
    ));
}

#[test]
fn test_vehicle_display_name() {
    let mut vehicle: VehicleInfo = VehicleInfo::default();
    assert_eq!(vehicle.display_name(), "(vehicle)");

    vehicle.brand = Some(String::from("Toyota"));
    assert_eq!(vehicle.display_name(), "Toyota");

    vehicle.model = Some(String::from("Camry"));
    assert_eq!(vehicle.display_name(), "Toyota Camry");
}

#[test]
fn test_stage_plan_rejects_empty() {
    let result: Result<StagePlan, DomainError> = StagePlan::new(Vec::new());
    assert!(matches!(result, Err(DomainError::EmptyStagePlan)));
}

#[test]
fn test_standard_plan_has_one_required_stage() {
    let plan: StagePlan = StagePlan::standard();
    assert_eq!(plan.len(), 1);
    assert!(plan.is_last(0));
    let stage: &StageDescriptor = plan.get(0).unwrap();
    assert!(stage.required);
    assert!(plan.by_title(&stage.title).is_some());
    assert!(plan.by_title(ADDITIONAL_STAGE_TITLE).is_none());
}

#[test]
fn test_stage_prefix_strips_emoji_and_joins_words() {
    assert_eq!(
        stage_prefix("\u{1f4f8} All vehicle photos and video"),
        "All_vehicle_photos_and_video"
    );
    assert_eq!(stage_prefix("Additional materials"), "Additional_materials");
    assert_eq!(stage_prefix("Front (left)"), "Front_left");
    assert_eq!(stage_prefix("\u{1f697}\u{1f4f8}"), "Unknown");
}

#[test]
fn test_stage_prefix_is_stable_under_repeated_separators() {
    assert_eq!(stage_prefix("A  --  B"), "A_B");
    assert_eq!(stage_prefix("  leading and trailing  "), "leading_and_trailing");
}

#[test]
fn test_media_kind_from_file_name() {
    assert_eq!(MediaKind::from_file_name("photo.JPG"), MediaKind::Photo);
    assert_eq!(MediaKind::from_file_name("clip.mp4"), MediaKind::Video);
    assert_eq!(MediaKind::from_file_name("walkaround.MOV"), MediaKind::Video);
    assert_eq!(MediaKind::from_file_name("notes.pdf"), MediaKind::Other);
    assert_eq!(MediaKind::from_file_name("no_extension"), MediaKind::Other);
}
