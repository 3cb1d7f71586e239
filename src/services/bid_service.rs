use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use crate::{
    db::DbPool,
    dto::listings::{BidStatus, HighestBidder},
    entity::{
        bids::{ActiveModel as BidActive, Column as BidCol, Entity as Bids, Model as BidModel},
        listing_details::Entity as ListingDetails,
        listings::Entity as Listings,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Bid,
    state::AppState,
};

/// Why a well-formed bid was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidRejection {
    AuctionClosed,
    BelowStartingBid,
    NotAboveHighestBid,
}

impl BidRejection {
    pub fn message(&self) -> &'static str {
        match self {
            BidRejection::AuctionClosed => "This auction is closed.",
            BidRejection::BelowStartingBid => "Your bid is smaller than the starting bid",
            BidRejection::NotAboveHighestBid => "Your bid is smaller than the highest bid",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BidOutcome {
    Accepted(Bid),
    Rejected(BidRejection),
}

/// Acceptance rule: the listing is open, the amount reaches the starting bid
/// and is strictly above the current highest bid.
pub fn evaluate_bid(
    active: bool,
    starting_bid: Decimal,
    highest_bid: Option<Decimal>,
    amount: Decimal,
) -> Result<(), BidRejection> {
    if !active {
        return Err(BidRejection::AuctionClosed);
    }
    if amount < starting_bid {
        return Err(BidRejection::BelowStartingBid);
    }
    if let Some(highest) = highest_bid {
        if amount <= highest {
            return Err(BidRejection::NotAboveHighestBid);
        }
    }
    Ok(())
}

/// Build the status line shown above the bid form.
pub fn bid_status(
    bid_count: i64,
    highest_bid: Option<Decimal>,
    highest_bidder: Option<HighestBidder>,
    viewer: Option<Uuid>,
) -> BidStatus {
    let mut parts = vec![format!("{bid_count} bid(s) so far.")];
    if let Some(bidder) = &highest_bidder {
        if viewer == Some(bidder.user_id) {
            parts.push("Your bid is the current bid.".to_string());
        } else {
            parts.push(format!("{} has the highest bid.", bidder.username));
        }
    }

    BidStatus {
        bid_count,
        highest_bid,
        highest_bidder,
        message: parts.join(" "),
    }
}

/// Count, maximum and holder of the maximum bid on a listing.
pub async fn load_bid_status(
    pool: &DbPool,
    listing_id: Uuid,
    viewer: Option<Uuid>,
) -> AppResult<BidStatus> {
    let (bid_count, highest_bid): (i64, Option<Decimal>) =
        sqlx::query_as("SELECT COUNT(*), MAX(amount) FROM bids WHERE listing_id = $1")
            .bind(listing_id)
            .fetch_one(pool)
            .await?;

    let highest_bidder = if bid_count > 0 {
        sqlx::query_as::<_, (Uuid, String)>(
            r#"
            SELECT b.user_id, u.username
            FROM bids b
            JOIN users u ON u.id = b.user_id
            WHERE b.listing_id = $1
            ORDER BY b.amount DESC, b.created_at ASC
            LIMIT 1
            "#,
        )
        .bind(listing_id)
        .fetch_optional(pool)
        .await?
        .map(|(user_id, username)| HighestBidder { user_id, username })
    } else {
        None
    };

    Ok(bid_status(bid_count, highest_bid, highest_bidder, viewer))
}

/// Place a bid. The listing row is locked for the duration of the check so
/// concurrent bids on one listing are evaluated one after another.
pub async fn place_bid(
    state: &AppState,
    user: &AuthUser,
    listing_id: Uuid,
    amount: Decimal,
) -> AppResult<BidOutcome> {
    let txn = state.orm.begin().await?;

    let listing = Listings::find_by_id(listing_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let detail = ListingDetails::find_by_id(listing_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::BadRequest("Listing has no detail record".into()))?;

    if detail.created_by == user.user_id {
        return Err(AppError::BadRequest(
            "Sellers cannot bid on their own listing".into(),
        ));
    }

    let highest_bid = Bids::find()
        .filter(BidCol::ListingId.eq(listing_id))
        .order_by_desc(BidCol::Amount)
        .one(&txn)
        .await?
        .map(|bid| bid.amount);

    if let Err(rejection) = evaluate_bid(listing.active, listing.starting_bid, highest_bid, amount)
    {
        tracing::debug!(
            %listing_id,
            user_id = %user.user_id,
            %amount,
            ?rejection,
            "bid rejected"
        );
        return Ok(BidOutcome::Rejected(rejection));
    }

    let bid = BidActive {
        id: Set(Uuid::new_v4()),
        amount: Set(amount),
        user_id: Set(user.user_id),
        listing_id: Set(listing_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(%listing_id, user_id = %user.user_id, %amount, "bid placed");
    Ok(BidOutcome::Accepted(bid_from_entity(bid)))
}

fn bid_from_entity(model: BidModel) -> Bid {
    Bid {
        id: model.id,
        amount: model.amount,
        user_id: model.user_id,
        listing_id: model.listing_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn first_bid_must_reach_starting_bid() {
        let start = dec("10.00");
        assert_eq!(
            evaluate_bid(true, start, None, dec("5.00")),
            Err(BidRejection::BelowStartingBid)
        );
        assert_eq!(
            evaluate_bid(true, start, None, dec("9.99")),
            Err(BidRejection::BelowStartingBid)
        );
        assert_eq!(evaluate_bid(true, start, None, dec("10.00")), Ok(()));
    }

    #[test]
    fn later_bids_must_beat_highest_strictly() {
        let start = dec("10.00");
        let highest = Some(dec("20.00"));
        assert_eq!(
            evaluate_bid(true, start, highest, dec("20.00")),
            Err(BidRejection::NotAboveHighestBid)
        );
        assert_eq!(
            evaluate_bid(true, start, highest, dec("19.99")),
            Err(BidRejection::NotAboveHighestBid)
        );
        assert_eq!(evaluate_bid(true, start, highest, dec("20.01")), Ok(()));
    }

    #[test]
    fn starting_bid_checked_before_highest() {
        assert_eq!(
            evaluate_bid(true, dec("50"), Some(dec("60")), dec("40")),
            Err(BidRejection::BelowStartingBid)
        );
    }

    #[test]
    fn closed_auction_rejects_everything() {
        assert_eq!(
            evaluate_bid(false, dec("1"), None, dec("1000")),
            Err(BidRejection::AuctionClosed)
        );
    }

    #[test]
    fn status_without_bids() {
        let status = bid_status(0, None, None, None);
        assert_eq!(status.message, "0 bid(s) so far.");
        assert!(status.highest_bidder.is_none());
    }

    #[test]
    fn status_names_highest_bidder_or_viewer() {
        let bidder = HighestBidder {
            user_id: Uuid::new_v4(),
            username: "alice".into(),
        };

        let other = bid_status(3, Some(dec("15")), Some(bidder.clone()), Some(Uuid::new_v4()));
        assert_eq!(other.message, "3 bid(s) so far. alice has the highest bid.");

        let anonymous = bid_status(3, Some(dec("15")), Some(bidder.clone()), None);
        assert_eq!(anonymous.message, "3 bid(s) so far. alice has the highest bid.");

        let own = bid_status(1, Some(dec("15")), Some(bidder.clone()), Some(bidder.user_id));
        assert_eq!(own.message, "1 bid(s) so far. Your bid is the current bid.");
    }
}
