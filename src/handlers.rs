// region:    --- Imports
use crate::auth::Principal;
use crate::bidding::{self, PlaceBidCommand};
use crate::database::DatabaseManager;
use crate::error::AuctionError;
use crate::listing::{self, CreateListingCommand};
use crate::models::{AuctionItem, Bid, ItemQuestion, User};
use crate::profile::{self, UpdateProfileCommand};
use crate::query;
use crate::questions::{self, AnswerQuestionCommand, AskQuestionCommand};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

// region:    --- Health

pub async fn handle_health() -> &'static str {
    "OK"
}

// endregion: --- Health

// region:    --- Listing Handlers

#[derive(Debug, Deserialize)]
pub struct ListItemsParams {
    pub search: Option<String>,
}

/// List all items, optionally filtered by a title search term
pub async fn handle_get_items(
    State(db_manager): State<Arc<DatabaseManager>>,
    Query(params): Query<ListItemsParams>,
) -> Result<Json<Vec<AuctionItem>>, AuctionError> {
    info!("{:<12} --> list items", "Handler");
    let items = query::handlers::list_items(&db_manager, params.search).await?;
    Ok(Json(items))
}

/// Create a listing owned by the caller
pub async fn handle_create_item(
    State(db_manager): State<Arc<DatabaseManager>>,
    principal: Principal,
    Json(cmd): Json<CreateListingCommand>,
) -> Result<(StatusCode, Json<AuctionItem>), AuctionError> {
    info!("{:<12} --> create item request: {:?}", "Handler", cmd);
    let item = listing::create_listing(&db_manager, principal, cmd, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Single item
pub async fn handle_get_item(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(item_id): Path<i64>,
) -> Result<Json<AuctionItem>, AuctionError> {
    info!("{:<12} --> get item id: {}", "Handler", item_id);
    let item = query::handlers::get_item(&db_manager, item_id).await?;
    Ok(Json(item))
}

// endregion: --- Listing Handlers

// region:    --- Bid Handlers

/// Bid ledger for an item, highest first
pub async fn handle_get_item_bids(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(item_id): Path<i64>,
) -> Result<Json<Vec<Bid>>, AuctionError> {
    info!("{:<12} --> get item bids id: {}", "Handler", item_id);
    let bids = query::handlers::get_item_bids(&db_manager, item_id).await?;
    Ok(Json(bids))
}

/// Place a bid; returns the updated item representation
pub async fn handle_place_bid(
    State(db_manager): State<Arc<DatabaseManager>>,
    principal: Principal,
    Path(item_id): Path<i64>,
    Json(cmd): Json<PlaceBidCommand>,
) -> Result<Json<AuctionItem>, AuctionError> {
    info!(
        "{:<12} --> bid request: item {} amount {}",
        "Handler", item_id, cmd.amount
    );
    let item = bidding::place_bid(&db_manager, principal, item_id, &cmd.amount, Utc::now()).await?;
    Ok(Json(item))
}

// endregion: --- Bid Handlers

// region:    --- Question Handlers

/// Questions asked about an item
pub async fn handle_get_item_questions(
    State(db_manager): State<Arc<DatabaseManager>>,
    Path(item_id): Path<i64>,
) -> Result<Json<Vec<ItemQuestion>>, AuctionError> {
    info!("{:<12} --> get item questions id: {}", "Handler", item_id);
    let questions = query::handlers::get_item_questions(&db_manager, item_id).await?;
    Ok(Json(questions))
}

/// Ask a question about an item
pub async fn handle_ask_question(
    State(db_manager): State<Arc<DatabaseManager>>,
    principal: Principal,
    Path(item_id): Path<i64>,
    Json(cmd): Json<AskQuestionCommand>,
) -> Result<(StatusCode, Json<ItemQuestion>), AuctionError> {
    info!("{:<12} --> ask question: item {}", "Handler", item_id);
    let question =
        questions::ask_question(&db_manager, principal, item_id, &cmd.question_text).await?;
    Ok((StatusCode::CREATED, Json(question)))
}

/// Answer a question (item owner only)
pub async fn handle_answer_question(
    State(db_manager): State<Arc<DatabaseManager>>,
    principal: Principal,
    Path(question_id): Path<i64>,
    Json(cmd): Json<AnswerQuestionCommand>,
) -> Result<Json<ItemQuestion>, AuctionError> {
    info!("{:<12} --> answer question: {}", "Handler", question_id);
    let question =
        questions::answer_question(&db_manager, principal, question_id, &cmd.answer_text).await?;
    Ok(Json(question))
}

// endregion: --- Question Handlers

// region:    --- Profile Handlers

/// The caller's own profile
pub async fn handle_get_profile(
    State(db_manager): State<Arc<DatabaseManager>>,
    principal: Principal,
) -> Result<Json<User>, AuctionError> {
    info!("{:<12} --> get profile: user {}", "Handler", principal.id);
    let user = query::handlers::get_user(&db_manager, principal.id).await?;
    Ok(Json(user))
}

/// Partial profile update
pub async fn handle_update_profile(
    State(db_manager): State<Arc<DatabaseManager>>,
    principal: Principal,
    Json(cmd): Json<UpdateProfileCommand>,
) -> Result<Json<User>, AuctionError> {
    info!("{:<12} --> update profile: user {}", "Handler", principal.id);
    let user = profile::update_profile(&db_manager, principal, cmd).await?;
    Ok(Json(user))
}

// endregion: --- Profile Handlers
