// region:    --- Imports
use crate::auth::Principal;
use crate::database::DatabaseManager;
use crate::error::AuctionError;
use crate::models::{AuctionItem, Bid};
use crate::query::queries;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::info;

// endregion: --- Imports

// region:    --- Command

/// Bid placement request body. The amount travels as a decimal string so it
/// never passes through binary floating point.
#[derive(Debug, Deserialize)]
pub struct PlaceBidCommand {
    pub amount: String,
}

/// Parse a raw bid amount into an exact decimal. Rejects anything non-numeric
/// or not strictly positive.
pub fn parse_amount(raw: &str) -> Result<Decimal, AuctionError> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|_| AuctionError::Validation(format!("'{raw}' is not a decimal amount")))?;
    if amount <= Decimal::ZERO {
        return Err(AuctionError::Validation(
            "bid amount must be positive".to_string(),
        ));
    }
    Ok(amount)
}

/// Validate and record a bid against an open item.
///
/// The item row is locked for the duration of the transaction, so two
/// concurrent bids on the same item serialize: the second one revalidates
/// against the first one's updated price instead of a stale read.
pub async fn place_bid(
    db_manager: &DatabaseManager,
    principal: Principal,
    item_id: i64,
    raw_amount: &str,
    now: DateTime<Utc>,
) -> Result<AuctionItem, AuctionError> {
    info!(
        "{:<12} --> place bid: item {} bidder {} amount {}",
        "Bidding", item_id, principal.id, raw_amount
    );

    let amount = parse_amount(raw_amount)?;

    let mut tx = db_manager.pool().begin().await?;

    // Dropping the transaction on any early return rolls it back.
    let item = sqlx::query_as::<_, AuctionItem>(queries::GET_ITEM_FOR_UPDATE)
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AuctionError::NotFound("item"))?;

    if item.ended_processed || item.end_datetime <= now {
        return Err(AuctionError::AlreadyEnded);
    }

    let floor = item.bid_floor();
    if amount <= floor {
        return Err(AuctionError::LowBid { current: floor });
    }

    sqlx::query_as::<_, Bid>(queries::INSERT_BID)
        .bind(item_id)
        .bind(principal.id)
        .bind(amount)
        .fetch_one(&mut *tx)
        .await?;

    sqlx::query(queries::UPDATE_CURRENT_BID)
        .bind(amount)
        .bind(item_id)
        .execute(&mut *tx)
        .await?;

    let updated = sqlx::query_as::<_, AuctionItem>(queries::GET_ITEM)
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        "{:<12} --> bid accepted: item {} now at {}",
        "Bidding", item_id, amount
    );
    Ok(updated)
}

// endregion: --- Command

// region:    --- Tests


// endregion: --- Tests
