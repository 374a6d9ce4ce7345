// region:    --- Imports
use crate::error::AuctionError;
use crate::models::{AuctionItem, Bid, User};
use crate::notifier::{winner_body, winner_subject, Notifier};
use crate::query::queries;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Winner Selection

/// Highest amount wins; a tie at the top goes to the earliest bid.
pub fn pick_winner(bids: &[Bid]) -> Option<&Bid> {
    bids.iter().fold(None, |best, bid| match best {
        None => Some(bid),
        Some(b) if bid.amount > b.amount => Some(bid),
        Some(b) if bid.amount == b.amount && bid.timestamp < b.timestamp => Some(bid),
        best => best,
    })
}

// endregion: --- Winner Selection

// region:    --- Auction Closer

/// Batch job finalizing listings whose end time has passed: pick the winner
/// from the bid ledger, record it on the item, notify the winner once.
pub struct AuctionCloser {
    pool: Arc<PgPool>,
    notifier: Arc<dyn Notifier>,
}

impl AuctionCloser {
    pub fn new(pool: Arc<PgPool>, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// One pass over every due, unprocessed item. Returns how many items were
    /// transitioned to `ended_processed` during this run. A failure on one
    /// item is logged and does not abort the rest of the scan.
    pub async fn process_ended_auctions(&self, now: DateTime<Utc>) -> Result<u64, AuctionError> {
        let due_ids: Vec<i64> = sqlx::query_scalar(queries::FIND_DUE_ITEM_IDS)
            .bind(now)
            .fetch_all(&*self.pool)
            .await?;

        info!(
            "{:<12} --> {} auction(s) due at {}",
            "Closer",
            due_ids.len(),
            now
        );

        let mut count = 0u64;
        for item_id in due_ids {
            match self.close_item(item_id).await {
                Ok(true) => count += 1,
                // Another pass got there first between the scan and the lock.
                Ok(false) => {}
                Err(e) => {
                    error!(
                        "{:<12} --> failed to close item {}: {:?}",
                        "Closer", item_id, e
                    );
                }
            }
        }

        info!("{:<12} --> processed {} ended auction(s)", "Closer", count);
        Ok(count)
    }

    /// Finalize a single item as its own atomic unit of work. The row stays
    /// exclusively locked until the transaction commits, so neither a
    /// concurrent pass nor a late bid can observe a half-closed item.
    async fn close_item(&self, item_id: i64) -> Result<bool, AuctionError> {
        let mut tx = self.pool.begin().await?;

        let item = sqlx::query_as::<_, AuctionItem>(queries::GET_DUE_ITEM_FOR_UPDATE)
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await?;
        let Some(item) = item else {
            return Ok(false);
        };

        let bids = sqlx::query_as::<_, Bid>(queries::GET_ITEM_BIDS_CHRONOLOGICAL)
            .bind(item_id)
            .fetch_all(&mut *tx)
            .await?;

        let Some(top_bid) = pick_winner(&bids) else {
            // No bids: closed, unsold. Nobody to notify.
            sqlx::query(queries::CLOSE_UNSOLD)
                .bind(item_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            info!(
                "{:<12} --> item {} closed unsold: '{}'",
                "Closer", item_id, item.title
            );
            return Ok(true);
        };

        let winner = sqlx::query_as::<_, User>(queries::GET_USER)
            .bind(top_bid.bidder_id)
            .fetch_one(&mut *tx)
            .await?;

        // A transport failure is logged and never retried: the item is marked
        // processed either way, so it can not be picked up again.
        let mut notified_at: Option<DateTime<Utc>> = None;
        if !winner.email.trim().is_empty() {
            let subject = winner_subject(&item.title);
            let body = winner_body(&winner.username, &item.title, top_bid.amount);
            match self.notifier.send(&winner.email, &subject, &body).await {
                Ok(()) => notified_at = Some(Utc::now()),
                Err(e) => {
                    error!(
                        "{:<12} --> winner notification for item {} failed: {}",
                        "Closer", item_id, e
                    );
                }
            }
        }

        sqlx::query(queries::CLOSE_WITH_WINNER)
            .bind(winner.id)
            .bind(top_bid.amount)
            .bind(notified_at)
            .bind(item_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!(
            "{:<12} --> item {} won by user {} at {}",
            "Closer", item_id, winner.id, top_bid.amount
        );
        Ok(true)
    }
}

// endregion: --- Auction Closer

// region:    --- Tests


// endregion: --- Tests
