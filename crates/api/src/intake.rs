// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bid intake: creation and opening.

use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::request_response::{BidStatusResponse, CreateBidRequest, CreateBidResponse};
use carbid::{Command, TransitionResult, apply};
use carbid_audit::Actor;
use carbid_domain::Bid;
use carbid_notify::{Outbound, Recipient, render_open_announcement};
use carbid_persistence::{CompanyRow, Persistence};
use tracing::info;

/// Creates a bid from intake data.
///
/// The bid starts parked unless `open_immediately` is set, in which
/// case it enters the open pool right away and the company group (if
/// one is bound) gets an announcement.
///
/// # Errors
///
/// Returns `ApiError::ResourceNotFound` if the company does not exist,
/// or a translated persistence error if the write fails.
pub fn create_bid(
    db: &mut Persistence,
    request: CreateBidRequest,
) -> Result<(CreateBidResponse, Vec<Outbound>), ApiError> {
    let company: CompanyRow = db
        .get_company(request.company_id)
        .map_err(translate_persistence_error)?;

    let mut bid: Bid = Bid::new(request.company_id);
    bid.dealer_id = request.dealer_id;
    bid.vehicle.brand = request.brand;
    bid.vehicle.model = request.model;
    bid.vehicle.year = request.year;
    bid.vehicle.mileage = request.mileage;
    bid.vehicle.power = request.power;
    bid.source_url = request.source_url;
    bid.thread_id = request.thread_id;

    let bid_id: i64 = db.create_bid(&bid).map_err(translate_persistence_error)?;
    bid.bid_id = Some(bid_id);
    info!(bid_id, company_id = request.company_id, "bid created");

    let mut outbounds: Vec<Outbound> = Vec::new();
    if request.open_immediately {
        let result: TransitionResult =
            apply(&bid, Command::OpenBid, Actor::Intake).map_err(translate_core_error)?;
        db.persist_transition(&result)
            .map_err(translate_persistence_error)?;
        bid = result.new_bid;
        if let Some(chat_id) = company.group_chat_id {
            outbounds.push(Outbound::new(
                Recipient::CompanyGroup(chat_id),
                render_open_announcement(&bid, &company.name),
            ));
        }
    }

    let response: CreateBidResponse = CreateBidResponse {
        bid_id,
        status: bid.status.as_str().to_string(),
        message: format!("Created bid {bid_id} for {}", company.name),
    };
    Ok((response, outbounds))
}

/// Opens a parked bid to the operator pool.
///
/// # Errors
///
/// Returns a translated error if the bid does not exist or is not in a
/// status that can open.
pub fn open_bid(
    db: &mut Persistence,
    bid_id: i64,
) -> Result<(BidStatusResponse, Vec<Outbound>), ApiError> {
    let bid: Bid = db.get_bid(bid_id).map_err(translate_persistence_error)?;
    let result: TransitionResult =
        apply(&bid, Command::OpenBid, Actor::Intake).map_err(translate_core_error)?;
    db.persist_transition(&result)
        .map_err(translate_persistence_error)?;
    info!(bid_id, "bid opened to the pool");

    let mut outbounds: Vec<Outbound> = Vec::new();
    let company: CompanyRow = db
        .get_company(result.new_bid.company_id)
        .map_err(translate_persistence_error)?;
    if let Some(chat_id) = company.group_chat_id {
        outbounds.push(Outbound::new(
            Recipient::CompanyGroup(chat_id),
            render_open_announcement(&result.new_bid, &company.name),
        ));
    }

    let response: BidStatusResponse = BidStatusResponse {
        bid_id,
        status: result.new_bid.status.as_str().to_string(),
    };
    Ok((response, outbounds))
}
