// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use carbid_domain::{Bid, BidStatus};

pub const TEST_OPERATOR: i64 = 42;
pub const TEST_REVIEWER: i64 = 7;

pub fn create_test_bid(status: BidStatus) -> Bid {
    let mut bid: Bid = Bid::new(1);
    bid.bid_id = Some(10);
    bid.status = status;
    if status.is_held_by_manager() {
        bid.manager_id = Some(TEST_OPERATOR);
    }
    bid
}

pub fn create_submittable_bid() -> Bid {
    let mut bid: Bid = create_test_bid(BidStatus::Progress);
    bid.checklist
        .set_answer(1, String::from("good"))
        .unwrap();
    bid.checklist
        .set_answer(2, String::from("half_tank"))
        .unwrap();
    bid
}
