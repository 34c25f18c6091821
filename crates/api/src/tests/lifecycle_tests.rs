// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{TEST_OPERATOR, TEST_REVIEWER, create_test_db, seed_company, seed_operator, test_plan, test_store};
use crate::error::ApiError;
use crate::request_response::{
    ApproveRequest, ChecklistAnswerRequest, ClaimBidRequest, CompleteStageRequest,
    CreateBidRequest, DeclineRequest, PrecheckRequest, ReworkRequest, SubmitRequest,
};
use crate::{
    answer_checklist, approve, bid_detail, claim_bid, complete_stage, create_bid, decline,
    open_bid, precheck, request_rework, store_file, submit,
};
use carbid::SessionTracker;
use carbid_domain::StagePlan;
use carbid_files::StageStore;
use carbid_notify::Recipient;
use carbid_persistence::Persistence;

fn intake_request(open_immediately: bool) -> CreateBidRequest {
    CreateBidRequest {
        company_id: 0,
        dealer_id: None,
        brand: Some(String::from("Toyota")),
        model: Some(String::from("Camry")),
        year: Some(2018),
        mileage: Some(90_000),
        power: None,
        source_url: Some(String::from("https://listings.example/1")),
        thread_id: None,
        open_immediately,
    }
}

/// Creates an open bid and walks it all the way to review.
async fn drive_to_review(
    db: &mut Persistence,
    sessions: &mut SessionTracker,
    store: &StageStore,
    plan: &StagePlan,
) -> i64 {
    let company_id: i64 = seed_company(db);
    seed_operator(db, TEST_OPERATOR, "operator");
    let mut request: CreateBidRequest = intake_request(true);
    request.company_id = company_id;
    let (created, _) = create_bid(db, request).unwrap();
    let bid_id: i64 = created.bid_id;

    claim_bid(db, sessions, bid_id, &ClaimBidRequest { operator_id: TEST_OPERATOR }).unwrap();
    precheck(db, sessions, &PrecheckRequest { operator_id: TEST_OPERATOR, on_site: true }).unwrap();
    store_file(db, sessions, store, plan, TEST_OPERATOR, "front.jpg", b"jpeg")
        .await
        .unwrap();
    complete_stage(sessions, store, plan, &CompleteStageRequest { operator_id: TEST_OPERATOR })
        .await
        .unwrap();
    answer_checklist(db, sessions, &ChecklistAnswerRequest {
        operator_id: TEST_OPERATOR,
        question: 1,
        answer: String::from("good"),
    })
    .unwrap();
    answer_checklist(db, sessions, &ChecklistAnswerRequest {
        operator_id: TEST_OPERATOR,
        question: 2,
        answer: String::from("half_tank"),
    })
    .unwrap();
    submit(db, sessions, &SubmitRequest { operator_id: TEST_OPERATOR }).unwrap();
    bid_id
}

#[test]
fn created_bid_is_parked_with_no_announcement() {
    let mut db = create_test_db();
    let company_id: i64 = seed_company(&mut db);
    let mut request: CreateBidRequest = intake_request(false);
    request.company_id = company_id;

    let (response, outbounds) = create_bid(&mut db, request).unwrap();
    assert_eq!(response.status, "disabled");
    assert!(outbounds.is_empty());
}

#[test]
fn immediate_open_announces_to_company_group() {
    let mut db = create_test_db();
    let company_id: i64 = seed_company(&mut db);
    let mut request: CreateBidRequest = intake_request(true);
    request.company_id = company_id;

    let (response, outbounds) = create_bid(&mut db, request).unwrap();
    assert_eq!(response.status, "open");
    assert_eq!(outbounds.len(), 1);
    assert_eq!(outbounds[0].recipient, Recipient::CompanyGroup(-100_200));
    assert!(outbounds[0].text.contains("Toyota Camry"));
}

#[test]
fn unknown_company_is_rejected() {
    let mut db = create_test_db();
    let request: CreateBidRequest = intake_request(false);

    let err: ApiError = create_bid(&mut db, request).unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn parked_bid_opens_once() {
    let mut db = create_test_db();
    let company_id: i64 = seed_company(&mut db);
    let mut request: CreateBidRequest = intake_request(false);
    request.company_id = company_id;
    let (created, _) = create_bid(&mut db, request).unwrap();

    let (opened, outbounds) = open_bid(&mut db, created.bid_id).unwrap();
    assert_eq!(opened.status, "open");
    assert_eq!(outbounds.len(), 1);

    let err: ApiError = open_bid(&mut db, created.bid_id).unwrap_err();
    assert!(matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "lifecycle"));
}

#[test]
fn claim_starts_the_wizard_and_beats_the_race() {
    let mut db = create_test_db();
    let mut sessions = SessionTracker::new();
    let company_id: i64 = seed_company(&mut db);
    seed_operator(&mut db, TEST_OPERATOR, "operator");
    seed_operator(&mut db, 43, "operator");
    let mut request: CreateBidRequest = intake_request(true);
    request.company_id = company_id;
    let (created, _) = create_bid(&mut db, request).unwrap();

    let (claimed, _) = claim_bid(
        &mut db,
        &mut sessions,
        created.bid_id,
        &ClaimBidRequest { operator_id: TEST_OPERATOR },
    )
    .unwrap();
    assert_eq!(claimed.step, "precheck_decision");

    let mut other_sessions = SessionTracker::new();
    let err: ApiError = claim_bid(
        &mut db,
        &mut other_sessions,
        created.bid_id,
        &ClaimBidRequest { operator_id: 43 },
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));
}

#[test]
fn claim_sends_an_assignment_notice_to_admins() {
    let mut db = create_test_db();
    let mut sessions = SessionTracker::new();
    let company_id: i64 = seed_company(&mut db);
    seed_operator(&mut db, TEST_OPERATOR, "operator");
    seed_operator(&mut db, 9, "admin");
    let mut request: CreateBidRequest = intake_request(true);
    request.company_id = company_id;
    let (created, _) = create_bid(&mut db, request).unwrap();

    let (_, outbounds) = claim_bid(
        &mut db,
        &mut sessions,
        created.bid_id,
        &ClaimBidRequest { operator_id: TEST_OPERATOR },
    )
    .unwrap();
    assert_eq!(outbounds.len(), 1);
    assert_eq!(outbounds[0].recipient, Recipient::Admin(9));
    assert!(outbounds[0].text.contains(&format!("#{}", created.bid_id)));
    assert!(outbounds[0].text.contains(&format!("operator {TEST_OPERATOR}")));
}

#[test]
fn operator_mid_wizard_cannot_claim_a_second_bid() {
    let mut db = create_test_db();
    let mut sessions = SessionTracker::new();
    let company_id: i64 = seed_company(&mut db);
    seed_operator(&mut db, TEST_OPERATOR, "operator");
    let mut first: CreateBidRequest = intake_request(true);
    first.company_id = company_id;
    let (bid_a, _) = create_bid(&mut db, first).unwrap();
    let mut second: CreateBidRequest = intake_request(true);
    second.company_id = company_id;
    let (bid_b, _) = create_bid(&mut db, second).unwrap();

    claim_bid(&mut db, &mut sessions, bid_a.bid_id, &ClaimBidRequest { operator_id: TEST_OPERATOR })
        .unwrap();
    let err: ApiError = claim_bid(
        &mut db,
        &mut sessions,
        bid_b.bid_id,
        &ClaimBidRequest { operator_id: TEST_OPERATOR },
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));

    // The second bid never left the pool.
    let detail = bid_detail(&mut db, bid_b.bid_id).unwrap();
    assert_eq!(detail.summary.status, "open");
    assert_eq!(detail.summary.manager_id, None);
}

#[tokio::test]
async fn approval_closes_the_bid_and_clears_the_manager() {
    let mut db = create_test_db();
    let mut sessions = SessionTracker::new();
    let store: StageStore = test_store();
    let plan: StagePlan = test_plan();
    let bid_id: i64 = drive_to_review(&mut db, &mut sessions, &store, &plan).await;

    let (response, outbounds) =
        approve(&mut db, bid_id, &ApproveRequest { reviewer_id: TEST_REVIEWER }).unwrap();
    assert_eq!(response.status, "done");
    assert_eq!(outbounds.len(), 1);
    assert_eq!(outbounds[0].recipient, Recipient::Operator(TEST_OPERATOR));
    assert!(outbounds[0].text.contains("approved"));

    let detail = bid_detail(&mut db, bid_id).unwrap();
    assert_eq!(detail.summary.manager_id, None);
    let actions: Vec<&str> = detail.audit.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(
        actions,
        vec!["open_bid", "claim_bid", "save_arrival", "submit_for_review", "approve_bid"]
    );
}

#[tokio::test]
async fn rework_returns_the_bid_to_its_operator() {
    let mut db = create_test_db();
    let mut sessions = SessionTracker::new();
    let store: StageStore = test_store();
    let plan: StagePlan = test_plan();
    let bid_id: i64 = drive_to_review(&mut db, &mut sessions, &store, &plan).await;

    let (response, outbounds) = request_rework(
        &mut db,
        &mut sessions,
        bid_id,
        &ReworkRequest {
            reviewer_id: TEST_REVIEWER,
            note: Some(String::from("engine bay photo missing")),
        },
    )
    .unwrap();
    assert_eq!(response.status, "progress");
    assert_eq!(outbounds.len(), 1);
    assert_eq!(outbounds[0].recipient, Recipient::Operator(TEST_OPERATOR));
    assert!(outbounds[0].text.contains("engine bay photo missing"));

    // The wizard re-enters at the additional-materials bucket.
    let session = sessions.get(TEST_OPERATOR).unwrap();
    assert_eq!(session.state.step_name(), "photo_additional");
}

#[tokio::test]
async fn decline_clears_the_inspection_state() {
    let mut db = create_test_db();
    let mut sessions = SessionTracker::new();
    let store: StageStore = test_store();
    let plan: StagePlan = test_plan();
    let bid_id: i64 = drive_to_review(&mut db, &mut sessions, &store, &plan).await;

    let (response, _) = decline(
        &mut db,
        &mut sessions,
        &DeclineRequest { operator_id: TEST_OPERATOR, reason: None },
    )
    .unwrap();
    assert_eq!(response.status, "open");
    assert!(sessions.is_empty());

    let detail = bid_detail(&mut db, bid_id).unwrap();
    assert_eq!(detail.summary.manager_id, None);
    assert_eq!(detail.checklist, vec![None, None]);
}

#[tokio::test]
async fn decline_reason_reaches_the_admins() {
    let mut db = create_test_db();
    let mut sessions = SessionTracker::new();
    let store: StageStore = test_store();
    let plan: StagePlan = test_plan();
    let bid_id: i64 = drive_to_review(&mut db, &mut sessions, &store, &plan).await;
    seed_operator(&mut db, 9, "admin");

    let (_, outbounds) = decline(
        &mut db,
        &mut sessions,
        &DeclineRequest {
            operator_id: TEST_OPERATOR,
            reason: Some(String::from("dealer closed early")),
        },
    )
    .unwrap();
    assert_eq!(outbounds.len(), 1);
    assert_eq!(outbounds[0].recipient, Recipient::Admin(9));
    assert!(outbounds[0].text.contains(&format!("#{bid_id}")));
    assert!(outbounds[0].text.contains("dealer closed early"));
}

#[test]
fn decline_without_a_held_bid_is_rejected() {
    let mut db = create_test_db();
    let mut sessions = SessionTracker::new();
    seed_operator(&mut db, TEST_OPERATOR, "operator");

    let err: ApiError = decline(
        &mut db,
        &mut sessions,
        &DeclineRequest { operator_id: TEST_OPERATOR, reason: None },
    )
    .unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}
