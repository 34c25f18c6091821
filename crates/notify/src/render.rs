// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Message text builders.
//!
//! Rendering is kept separate from delivery so tests can assert on the
//! text without a transport.

use carbid_domain::{Bid, OperatorId};
use std::fmt::Write as _;

/// The announcement sent to idle operators for one open bid.
#[must_use]
pub fn render_open_announcement(bid: &Bid, company_name: &str) -> String {
    let mut text: String = format!(
        "New inspection available: {} for {company_name}",
        bid.vehicle.display_name()
    );
    if let Some(year) = bid.vehicle.year {
        let _ = write!(text, ", {year}");
    }
    if let Some(mileage) = bid.vehicle.mileage {
        let _ = write!(text, ", {mileage} km");
    }
    if let Some(url) = bid.source_url.as_deref() {
        let _ = write!(text, "\n{url}");
    }
    if let Some(id) = bid.bid_id {
        let _ = write!(text, "\nBid #{id}");
    }
    text
}

/// The periodic digest of the open pool, sent to administrators.
#[must_use]
pub fn render_digest(open_bids: &[Bid]) -> String {
    if open_bids.is_empty() {
        return String::from("Open pool is empty.");
    }
    let mut text: String = format!("Open pool: {} bid(s) waiting\n", open_bids.len());
    for bid in open_bids {
        let id: i64 = bid.bid_id.unwrap_or_default();
        let _ = writeln!(text, "  #{id} {}", bid.vehicle.display_name());
    }
    text.truncate(text.trim_end().len());
    text
}

/// The package sent to administrators when an operator submits a bid
/// for review: a header line, what was collected per stage, and the
/// checklist answers.
#[must_use]
pub fn render_review_package(
    bid: &Bid,
    operator_id: OperatorId,
    stage_counts: &[(String, usize)],
) -> String {
    let id: i64 = bid.bid_id.unwrap_or_default();
    let mut text: String = format!(
        "Bid #{id} ({}) submitted for review by operator {operator_id}",
        bid.vehicle.display_name()
    );
    for (stage_title, count) in stage_counts {
        let _ = write!(text, "\n  {stage_title}: {count} file(s)");
    }
    let _ = write!(
        text,
        "\nChecklist: 1) {} 2) {}",
        bid.checklist.point1.as_deref().unwrap_or("-"),
        bid.checklist.point2.as_deref().unwrap_or("-"),
    );
    text
}

/// The notice sent to the holding operator when a reviewer requests
/// rework.
#[must_use]
pub fn render_rework_notice(bid: &Bid, note: Option<&str>) -> String {
    let id: i64 = bid.bid_id.unwrap_or_default();
    note.map_or_else(
        || format!("Bid #{id}: the reviewer needs additional materials."),
        |note| format!("Bid #{id}: the reviewer needs additional materials.\nNote: {note}"),
    )
}
