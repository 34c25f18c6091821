// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod lifecycle_tests;

use carbid_domain::StagePlan;
use carbid_files::StageStore;
use carbid_persistence::Persistence;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

pub const TEST_OPERATOR: i64 = 42;
pub const TEST_REVIEWER: i64 = 7;

pub fn create_test_db() -> Persistence {
    Persistence::new_in_memory().expect("in-memory database")
}

pub fn seed_company(db: &mut Persistence) -> i64 {
    db.create_company("Sewa Motors", Some(-100_200)).unwrap()
}

pub fn seed_operator(db: &mut Persistence, operator_id: i64, role: &str) {
    db.ensure_operator(operator_id, "Test Operator", role)
        .unwrap();
}

pub fn test_store() -> StageStore {
    let n: u64 = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    let root: PathBuf = std::env::temp_dir().join(format!(
        "carbid-api-test-{}-{n}",
        std::process::id()
    ));
    StageStore::new(root)
}

pub fn test_plan() -> StagePlan {
    StagePlan::standard()
}
