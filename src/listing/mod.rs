// region:    --- Imports
use crate::auth::Principal;
use crate::database::DatabaseManager;
use crate::error::AuctionError;
use crate::models::AuctionItem;
use crate::query::queries;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use tracing::info;

// endregion: --- Imports

// region:    --- Command

/// Listing creation request body. The starting bid travels as a decimal
/// string, like bid amounts.
#[derive(Debug, Deserialize)]
pub struct CreateListingCommand {
    pub title: String,
    pub description: String,
    pub starting_bid: String,
    pub end_datetime: DateTime<Utc>,
    pub image: Option<String>,
}

/// Check a listing request: non-empty title, non-negative decimal starting
/// bid, end time in the future. Returns the cleaned title and parsed amount.
pub fn validate_listing(
    cmd: &CreateListingCommand,
    now: DateTime<Utc>,
) -> Result<(String, Decimal), AuctionError> {
    let title = cmd.title.trim().to_string();
    if title.is_empty() {
        return Err(AuctionError::Validation("title must not be empty".into()));
    }
    let starting_bid = Decimal::from_str(cmd.starting_bid.trim()).map_err(|_| {
        AuctionError::Validation(format!("'{}' is not a decimal amount", cmd.starting_bid))
    })?;
    if starting_bid < Decimal::ZERO {
        return Err(AuctionError::Validation(
            "starting bid must not be negative".into(),
        ));
    }
    if cmd.end_datetime <= now {
        return Err(AuctionError::Validation(
            "end time must be in the future".into(),
        ));
    }
    Ok((title, starting_bid))
}

/// Create a listing owned by the caller.
pub async fn create_listing(
    db_manager: &DatabaseManager,
    principal: Principal,
    cmd: CreateListingCommand,
    now: DateTime<Utc>,
) -> Result<AuctionItem, AuctionError> {
    info!(
        "{:<12} --> create listing '{}' by user {}",
        "Listing", cmd.title, principal.id
    );

    let (title, starting_bid) = validate_listing(&cmd, now)?;

    db_manager
        .transaction(move |tx| {
            Box::pin(async move {
                let item = sqlx::query_as::<_, AuctionItem>(queries::INSERT_ITEM)
                    .bind(principal.id)
                    .bind(&title)
                    .bind(cmd.description.trim())
                    .bind(starting_bid)
                    .bind(&cmd.image)
                    .bind(cmd.end_datetime)
                    .fetch_one(&mut **tx)
                    .await?;
                Ok(item)
            })
        })
        .await
}

// endregion: --- Command

// region:    --- Tests


// endregion: --- Tests
