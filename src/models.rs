// region:    --- Imports
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// endregion: --- Imports

// region:    --- Models

/// An item listed for auction. `current_bid` is null until the first accepted
/// bid; the winner fields are set only once the closer has processed the item.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuctionItem {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub starting_bid: Decimal,
    pub current_bid: Option<Decimal>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub end_datetime: DateTime<Utc>,
    pub ended_processed: bool,
    pub winner_id: Option<i64>,
    pub winning_bid: Option<Decimal>,
    pub winner_notified_at: Option<DateTime<Utc>>,
}

impl AuctionItem {
    /// The amount a new bid has to beat.
    pub fn bid_floor(&self) -> Decimal {
        match self.current_bid {
            Some(current) if current > self.starting_bid => current,
            _ => self.starting_bid,
        }
    }
}

/// One row of the append-only bid ledger. Never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Bid {
    pub id: i64,
    pub item_id: i64,
    pub bidder_id: i64,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// A question asked about an item. `answered_at` is set exactly when
/// `answer_text` is; only the item owner answers.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ItemQuestion {
    pub id: i64,
    pub item_id: i64,
    pub asked_by: i64,
    pub question_text: String,
    pub answer_text: Option<String>,
    pub asked_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_image: Option<String>,
}

// endregion: --- Models

// region:    --- Tests


// endregion: --- Tests
