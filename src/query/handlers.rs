// region:    --- Imports
use super::queries;
use crate::database::DatabaseManager;
use crate::error::AuctionError;
use crate::models::{AuctionItem, Bid, ItemQuestion, User};
use tracing::info;

// endregion: --- Imports

// region:    --- Query Handlers

/// Single item lookup
pub async fn get_item(
    db_manager: &DatabaseManager,
    item_id: i64,
) -> Result<AuctionItem, AuctionError> {
    info!("{:<12} --> get item id: {}", "Query", item_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, AuctionItem>(queries::GET_ITEM)
                    .bind(item_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or(AuctionError::NotFound("item"))
            })
        })
        .await
}

/// All listings, optionally filtered by a title search term
pub async fn list_items(
    db_manager: &DatabaseManager,
    search: Option<String>,
) -> Result<Vec<AuctionItem>, AuctionError> {
    info!("{:<12} --> list items, search: {:?}", "Query", search);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let items = match search {
                    Some(term) if !term.trim().is_empty() => {
                        sqlx::query_as::<_, AuctionItem>(queries::SEARCH_ITEMS)
                            .bind(format!("%{}%", term.trim()))
                            .fetch_all(&mut **tx)
                            .await?
                    }
                    _ => {
                        sqlx::query_as::<_, AuctionItem>(queries::LIST_ITEMS)
                            .fetch_all(&mut **tx)
                            .await?
                    }
                };
                Ok(items)
            })
        })
        .await
}

/// Bid ledger for an item: amount descending, earliest first within a tie
pub async fn get_item_bids(
    db_manager: &DatabaseManager,
    item_id: i64,
) -> Result<Vec<Bid>, AuctionError> {
    info!("{:<12} --> get item bids id: {}", "Query", item_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let bids = sqlx::query_as::<_, Bid>(queries::GET_ITEM_BIDS)
                    .bind(item_id)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok(bids)
            })
        })
        .await
}

/// Questions asked about an item, oldest first
pub async fn get_item_questions(
    db_manager: &DatabaseManager,
    item_id: i64,
) -> Result<Vec<ItemQuestion>, AuctionError> {
    info!("{:<12} --> get item questions id: {}", "Query", item_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                let questions = sqlx::query_as::<_, ItemQuestion>(queries::GET_ITEM_QUESTIONS)
                    .bind(item_id)
                    .fetch_all(&mut **tx)
                    .await?;
                Ok(questions)
            })
        })
        .await
}

/// User lookup
pub async fn get_user(db_manager: &DatabaseManager, user_id: i64) -> Result<User, AuctionError> {
    info!("{:<12} --> get user id: {}", "Query", user_id);
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, User>(queries::GET_USER)
                    .bind(user_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or(AuctionError::NotFound("user"))
            })
        })
        .await
}

// endregion: --- Query Handlers
