// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{BatchOutcome, FileStoreError, MAX_FILE_BYTES, StageStore, StageSummary, StoredFile};
use carbid_domain::{ADDITIONAL_STAGE_TITLE, MediaKind, StagePlan};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

fn create_test_store() -> StageStore {
    let id: u64 = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    let root: PathBuf = std::env::temp_dir().join(format!(
        "carbid_files_test_{}_{id}",
        std::process::id()
    ));
    StageStore::new(root)
}

const STAGE: &str = "All vehicle photos and video";

#[tokio::test]
async fn test_record_places_file_under_operator_and_bid() {
    let store: StageStore = create_test_store();

    let stored: StoredFile = store
        .record(42, 10, STAGE, "front.jpg", b"jpegdata")
        .await
        .unwrap();

    assert!(stored.path.starts_with(store.bid_dir(42, 10)));
    assert!(
        stored
            .file_name
            .starts_with("All_vehicle_photos_and_video_")
    );
    assert!(stored.file_name.ends_with("_front.jpg"));
    assert_eq!(stored.kind, MediaKind::Photo);

    let bytes: Vec<u8> = tokio::fs::read(&stored.path).await.unwrap();
    assert_eq!(bytes, b"jpegdata");
}

#[tokio::test]
async fn test_record_rejects_oversized_file() {
    let store: StageStore = create_test_store();
    let bytes: Vec<u8> = vec![0_u8; MAX_FILE_BYTES + 1];

    let result: Result<StoredFile, FileStoreError> =
        store.record(42, 10, STAGE, "huge.mp4", &bytes).await;

    assert!(matches!(
        result,
        Err(FileStoreError::TooLarge { size, max, .. })
            if size == MAX_FILE_BYTES + 1 && max == MAX_FILE_BYTES
    ));

    // Nothing was written.
    let files: Vec<StoredFile> = store.list_all(42, 10).await.unwrap();
    assert!(files.is_empty());
}

#[tokio::test]
async fn test_record_sanitizes_traversal_names() {
    let store: StageStore = create_test_store();

    let stored: StoredFile = store
        .record(42, 10, STAGE, "../../../etc/passwd", b"x")
        .await
        .unwrap();

    assert!(stored.path.starts_with(store.bid_dir(42, 10)));
    assert!(stored.file_name.ends_with("_passwd"));

    let result: Result<StoredFile, FileStoreError> =
        store.record(42, 10, STAGE, "../..", b"x").await;
    assert!(matches!(result, Err(FileStoreError::EmptyFileName)));
}

#[tokio::test]
async fn test_same_name_twice_keeps_both_files() {
    let store: StageStore = create_test_store();

    store.record(42, 10, STAGE, "a.jpg", b"one").await.unwrap();
    store.record(42, 10, STAGE, "a.jpg", b"two").await.unwrap();

    let files: Vec<StoredFile> = store.list_stage(42, 10, STAGE).await.unwrap();
    assert_eq!(files.len(), 2);
}

#[tokio::test]
async fn test_stage_listing_is_isolated_by_prefix() {
    let store: StageStore = create_test_store();

    store.record(42, 10, STAGE, "a.jpg", b"x").await.unwrap();
    store
        .record(42, 10, ADDITIONAL_STAGE_TITLE, "b.jpg", b"x")
        .await
        .unwrap();

    let main: Vec<StoredFile> = store.list_stage(42, 10, STAGE).await.unwrap();
    assert_eq!(main.len(), 1);
    assert_eq!(store.count_in_stage(42, 10, STAGE).await.unwrap(), 1);

    let extra: Vec<StoredFile> = store
        .list_stage(42, 10, ADDITIONAL_STAGE_TITLE)
        .await
        .unwrap();
    assert_eq!(extra.len(), 1);
    assert!(extra[0].file_name.starts_with("Additional_materials_"));
}

#[tokio::test]
async fn test_listing_missing_bid_is_empty() {
    let store: StageStore = create_test_store();

    let files: Vec<StoredFile> = store.list_all(42, 999).await.unwrap();
    assert!(files.is_empty());
    assert_eq!(store.count_in_stage(42, 999, STAGE).await.unwrap(), 0);
}

#[tokio::test]
async fn test_batch_stores_all_files_and_reports_failures() {
    let store: StageStore = create_test_store();

    let files: Vec<(String, Vec<u8>)> = vec![
        (String::from("one.jpg"), b"1".to_vec()),
        (String::from("clip.mp4"), b"2".to_vec()),
        (String::from("huge.mp4"), vec![0_u8; MAX_FILE_BYTES + 1]),
        (String::from("two.jpg"), b"3".to_vec()),
    ];

    let outcome: BatchOutcome = store.record_batch(42, 10, STAGE, files).await;

    // Siblings of the failed file still land; there is no rollback.
    assert_eq!(outcome.stored.len(), 3);
    assert_eq!(outcome.failed.len(), 1);
    assert_eq!(outcome.failed[0].0, "huge.mp4");
    assert!(matches!(
        outcome.failed[0].1,
        FileStoreError::TooLarge { .. }
    ));
    assert_eq!(store.count_in_stage(42, 10, STAGE).await.unwrap(), 3);
}

#[tokio::test]
async fn test_batch_members_get_distinct_names() {
    let store: StageStore = create_test_store();

    let files: Vec<(String, Vec<u8>)> = vec![
        (String::from("a.jpg"), b"1".to_vec()),
        (String::from("a.jpg"), b"2".to_vec()),
        (String::from("a.jpg"), b"3".to_vec()),
    ];

    let outcome: BatchOutcome = store.record_batch(42, 10, STAGE, files).await;

    assert_eq!(outcome.stored.len(), 3);
    let mut names: Vec<String> = outcome
        .stored
        .iter()
        .map(|f| f.file_name.clone())
        .collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), 3);
}

#[tokio::test]
async fn test_summarize_counts_plan_stages_and_additional_bucket() {
    let store: StageStore = create_test_store();
    let plan: StagePlan = StagePlan::standard();

    store.record(42, 10, STAGE, "a.jpg", b"x").await.unwrap();
    store.record(42, 10, STAGE, "b.jpg", b"x").await.unwrap();

    let summaries: Vec<StageSummary> = store.summarize(42, 10, &plan).await.unwrap();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].title, STAGE);
    assert_eq!(summaries[0].file_count, 2);
    assert_eq!(summaries[1].title, ADDITIONAL_STAGE_TITLE);
    assert_eq!(summaries[1].file_count, 0);
}
