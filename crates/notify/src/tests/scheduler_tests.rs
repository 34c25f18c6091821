// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{FailingSink, RecordingSink, create_test_db, seed_company, seed_open_bid, seed_operator};
use crate::reminder::{ReminderConfig, ReminderScheduler};
use crate::roles::RoleDirectory;
use crate::sink::{Outbound, Recipient};
use carbid_domain::{Bid, BidStatus};
use carbid_persistence::Persistence;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

fn fast_config() -> ReminderConfig {
    ReminderConfig {
        tick: Duration::from_millis(10),
        age_threshold: Duration::ZERO,
        digest_every_ticks: 1,
        inter_bid_delay: Duration::ZERO,
    }
}

fn scheduler_with(
    db: &Arc<Mutex<Persistence>>,
    sink: Arc<dyn crate::sink::NotificationSink>,
) -> ReminderScheduler {
    let roles: Arc<RoleDirectory> = Arc::new(RoleDirectory::new(Arc::clone(db)));
    ReminderScheduler::new(Arc::clone(db), roles, sink, fast_config())
}

#[tokio::test]
async fn sweep_announces_to_idle_operators_and_marks_shown() {
    let db = create_test_db();
    let company_id: i64 = seed_company(&db).await;
    seed_operator(&db, 1, "operator").await;
    seed_operator(&db, 2, "operator").await;
    seed_operator(&db, 9, "admin").await;
    let bid_id: i64 = seed_open_bid(&db, company_id, 120).await;

    let sink: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let scheduler = scheduler_with(&db, Arc::clone(&sink) as Arc<dyn crate::sink::NotificationSink>);

    let announced: usize = scheduler.sweep_once().await.unwrap();
    assert_eq!(announced, 1);

    let sent: Vec<Outbound> = sink.sent().await;
    assert_eq!(sent.len(), 2);
    let mut recipients: Vec<Recipient> = sent.iter().map(|o| o.recipient).collect();
    recipients.sort_by_key(|r| match r {
        Recipient::Operator(id) | Recipient::Admin(id) => *id,
        Recipient::CompanyGroup(id) => *id,
    });
    assert_eq!(
        recipients,
        vec![Recipient::Operator(1), Recipient::Operator(2)]
    );
    assert!(sent[0].text.contains("Toyota Camry"));
    assert!(sent[0].text.contains("Sewa Motors"));
    assert!(sent[0].text.contains(&format!("Bid #{bid_id}")));
    assert_eq!(sent[0].claim_bid, Some(bid_id));

    // Already shown; the next sweep finds nothing.
    assert_eq!(scheduler.sweep_once().await.unwrap(), 0);
}

#[tokio::test]
async fn fresh_bid_is_not_due_yet() {
    let db = create_test_db();
    let company_id: i64 = seed_company(&db).await;
    seed_operator(&db, 1, "operator").await;
    seed_open_bid(&db, company_id, 0).await;

    let sink: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let roles: Arc<RoleDirectory> = Arc::new(RoleDirectory::new(Arc::clone(&db)));
    let config = ReminderConfig {
        age_threshold: Duration::from_secs(60),
        ..fast_config()
    };
    let scheduler = ReminderScheduler::new(Arc::clone(&db), roles, Arc::clone(&sink) as Arc<dyn crate::sink::NotificationSink>, config);

    assert_eq!(scheduler.sweep_once().await.unwrap(), 0);
    assert!(sink.sent().await.is_empty());
}

#[tokio::test]
async fn operator_holding_a_bid_is_skipped() {
    let db = create_test_db();
    let company_id: i64 = seed_company(&db).await;
    seed_operator(&db, 1, "operator").await;
    seed_operator(&db, 2, "operator").await;
    let held_id: i64 = seed_open_bid(&db, company_id, 120).await;
    seed_open_bid(&db, company_id, 120).await;
    db.lock().await.claim_bid(held_id, 2).unwrap();

    let sink: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let scheduler = scheduler_with(&db, Arc::clone(&sink) as Arc<dyn crate::sink::NotificationSink>);

    assert_eq!(scheduler.sweep_once().await.unwrap(), 1);
    let sent: Vec<Outbound> = sink.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, Recipient::Operator(1));
}

#[tokio::test]
async fn failing_recipient_does_not_block_the_rest() {
    let db = create_test_db();
    let company_id: i64 = seed_company(&db).await;
    seed_operator(&db, 1, "operator").await;
    seed_operator(&db, 2, "operator").await;
    seed_open_bid(&db, company_id, 120).await;

    let sink: Arc<FailingSink> = Arc::new(FailingSink::rejecting(Recipient::Operator(1)));
    let scheduler = scheduler_with(&db, Arc::clone(&sink) as Arc<dyn crate::sink::NotificationSink>);

    // One delivery fails, the other lands, and the bid is still
    // marked shown.
    assert_eq!(scheduler.sweep_once().await.unwrap(), 1);
    let sent: Vec<Outbound> = sink.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, Recipient::Operator(2));
    assert_eq!(scheduler.sweep_once().await.unwrap(), 0);
}

#[tokio::test]
async fn fully_failed_fan_out_still_marks_the_bid_shown() {
    let db = create_test_db();
    let company_id: i64 = seed_company(&db).await;
    seed_operator(&db, 1, "operator").await;
    seed_open_bid(&db, company_id, 120).await;

    let failing: Arc<FailingSink> = Arc::new(FailingSink::rejecting_all());
    let scheduler = scheduler_with(&db, Arc::clone(&failing) as Arc<dyn crate::sink::NotificationSink>);

    // Every delivery is attempted and fails; the bid is still consumed.
    assert_eq!(scheduler.sweep_once().await.unwrap(), 1);
    assert_eq!(scheduler.sweep_once().await.unwrap(), 0);
}

#[tokio::test]
async fn sweep_without_idle_operators_leaves_the_pool_untouched() {
    let db = create_test_db();
    let company_id: i64 = seed_company(&db).await;
    seed_operator(&db, 1, "operator").await;
    let held_id: i64 = seed_open_bid(&db, company_id, 120).await;
    seed_open_bid(&db, company_id, 120).await;
    db.lock().await.claim_bid(held_id, 1).unwrap();

    let sink: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let scheduler = scheduler_with(&db, Arc::clone(&sink) as Arc<dyn crate::sink::NotificationSink>);
    assert_eq!(scheduler.sweep_once().await.unwrap(), 0);
    assert!(sink.sent().await.is_empty());

    // Once the operator frees up both bids are announced after all.
    {
        let mut guard = db.lock().await;
        let mut held: Bid = guard.get_bid(held_id).unwrap();
        held.status = BidStatus::Open;
        held.manager_id = None;
        guard.save_bid(&held).unwrap();
    }
    assert_eq!(scheduler.sweep_once().await.unwrap(), 2);
}

#[test]
fn default_digest_fires_every_ninety_sweeps() {
    assert_eq!(ReminderConfig::default().digest_every_ticks, 90);
}

#[tokio::test]
async fn digest_goes_to_admins_only() {
    let db = create_test_db();
    let company_id: i64 = seed_company(&db).await;
    seed_operator(&db, 1, "operator").await;
    seed_operator(&db, 9, "admin").await;
    seed_open_bid(&db, company_id, 120).await;
    seed_open_bid(&db, company_id, 30).await;

    let sink: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let scheduler = scheduler_with(&db, Arc::clone(&sink) as Arc<dyn crate::sink::NotificationSink>);

    scheduler.send_digest().await.unwrap();
    let sent: Vec<Outbound> = sink.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipient, Recipient::Admin(9));
    assert!(sent[0].text.contains("2 bid(s) waiting"));
}

#[tokio::test]
async fn digest_reports_an_empty_pool() {
    let db = create_test_db();
    seed_operator(&db, 9, "admin").await;

    let sink: Arc<RecordingSink> = Arc::new(RecordingSink::default());
    let scheduler = scheduler_with(&db, Arc::clone(&sink) as Arc<dyn crate::sink::NotificationSink>);

    scheduler.send_digest().await.unwrap();
    let sent: Vec<Outbound> = sink.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "Open pool is empty.");
}
