//! End-to-end tests against a live Postgres. Run with:
//!     DATABASE_URL=postgres://... cargo test -- --ignored

use async_trait::async_trait;
use auction_house::auth::Principal;
use auction_house::bidding;
use auction_house::closer::AuctionCloser;
use auction_house::database::DatabaseManager;
use auction_house::error::AuctionError;
use auction_house::models::{AuctionItem, User};
use auction_house::notifier::Notifier;
use auction_house::query;
use auction_house::questions;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::{Arc, Mutex};

// region:    --- Test Doubles

/// Records every send instead of talking to a mail gateway.
#[derive(Default)]
struct MockNotifier {
    sent: Mutex<Vec<(String, String, String)>>,
}

impl MockNotifier {
    fn sent_to(&self, address: &str) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _, _)| to == address)
            .count()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AuctionError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// Always fails, for the fire-and-forget delivery semantics.
struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), AuctionError> {
        Err(AuctionError::Transport("gateway unreachable".to_string()))
    }
}

// endregion: --- Test Doubles

// region:    --- Helpers

async fn setup() -> Arc<DatabaseManager> {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db_manager = Arc::new(
        DatabaseManager::new(&url)
            .await
            .expect("failed to connect"),
    );
    db_manager
        .initialize_database()
        .await
        .expect("failed to initialize schema");
    db_manager
}

/// Usernames are unique, so every test creates its own users.
async fn create_user(db_manager: &DatabaseManager, prefix: &str, email: &str) -> User {
    let username = format!("{}_{}", prefix, Utc::now().timestamp_nanos_opt().unwrap());
    let email = email.to_string();
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, User>(
                    "INSERT INTO users (username, email) VALUES ($1, $2)
                     RETURNING id, username, email, date_of_birth, profile_image",
                )
                .bind(&username)
                .bind(&email)
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await
        .unwrap()
}

async fn create_item(
    db_manager: &DatabaseManager,
    owner_id: i64,
    starting_bid: Decimal,
    end_datetime: DateTime<Utc>,
) -> AuctionItem {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query_as::<_, AuctionItem>(
                    "INSERT INTO auction_items (owner_id, title, description, starting_bid, end_datetime)
                     VALUES ($1, $2, $3, $4, $5)
                     RETURNING id, owner_id, title, description, starting_bid, current_bid, image, created_at, end_datetime, ended_processed, winner_id, winning_bid, winner_notified_at",
                )
                .bind(owner_id)
                .bind("Vintage lamp")
                .bind("A lamp, vintage.")
                .bind(starting_bid)
                .bind(end_datetime)
                .fetch_one(&mut **tx)
                .await
            })
        })
        .await
        .unwrap()
}

/// Append directly to the ledger with an explicit timestamp, bypassing
/// validation, to stage historical bids.
async fn insert_bid_at(
    db_manager: &DatabaseManager,
    item_id: i64,
    bidder_id: i64,
    amount: Decimal,
    timestamp: DateTime<Utc>,
) {
    db_manager
        .transaction(|tx| {
            Box::pin(async move {
                sqlx::query(
                    "INSERT INTO bids (item_id, bidder_id, amount, timestamp) VALUES ($1, $2, $3, $4)",
                )
                .bind(item_id)
                .bind(bidder_id)
                .bind(amount)
                .bind(timestamp)
                .execute(&mut **tx)
                .await
            })
        })
        .await
        .unwrap();
}

// endregion: --- Helpers

// region:    --- Bidding Tests

#[tokio::test]
#[ignore = "requires a Postgres database via DATABASE_URL"]
async fn accepted_bid_updates_ledger_and_current_bid() {
    let db = setup().await;
    let owner = create_user(&db, "owner", "owner@example.com").await;
    let bidder = create_user(&db, "bidder", "bidder@example.com").await;
    let item = create_item(&db, owner.id, dec!(10.00), Utc::now() + Duration::hours(1)).await;

    let updated = bidding::place_bid(
        &db,
        Principal { id: bidder.id },
        item.id,
        "15.00",
        Utc::now(),
    )
    .await
    .unwrap();

    assert_eq!(updated.current_bid, Some(dec!(15.00)));
    let bids = query::handlers::get_item_bids(&db, item.id).await.unwrap();
    assert_eq!(bids.len(), 1);
    assert_eq!(bids[0].amount, dec!(15.00));
    assert_eq!(bids[0].bidder_id, bidder.id);
}

#[tokio::test]
#[ignore = "requires a Postgres database via DATABASE_URL"]
async fn low_bid_is_rejected_and_leaves_state_unchanged() {
    let db = setup().await;
    let owner = create_user(&db, "owner", "owner@example.com").await;
    let bidder = create_user(&db, "bidder", "bidder@example.com").await;
    let item = create_item(&db, owner.id, dec!(10.00), Utc::now() + Duration::hours(1)).await;

    let err = bidding::place_bid(
        &db,
        Principal { id: bidder.id },
        item.id,
        "5.00",
        Utc::now(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AuctionError::LowBid { current } if current == dec!(10.00)));
    let reloaded = query::handlers::get_item(&db, item.id).await.unwrap();
    assert_eq!(reloaded.current_bid, None);
    assert!(query::handlers::get_item_bids(&db, item.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore = "requires a Postgres database via DATABASE_URL"]
async fn bid_on_ended_item_is_rejected() {
    let db = setup().await;
    let owner = create_user(&db, "owner", "owner@example.com").await;
    let bidder = create_user(&db, "bidder", "bidder@example.com").await;
    let item = create_item(&db, owner.id, dec!(10.00), Utc::now() - Duration::hours(1)).await;

    let err = bidding::place_bid(
        &db,
        Principal { id: bidder.id },
        item.id,
        "15.00",
        Utc::now(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, AuctionError::AlreadyEnded));
}

#[tokio::test]
#[ignore = "requires a Postgres database via DATABASE_URL"]
async fn concurrent_bids_on_one_item_serialize() {
    let db = setup().await;
    let owner = create_user(&db, "owner", "owner@example.com").await;
    let item = create_item(&db, owner.id, dec!(10.00), Utc::now() + Duration::hours(1)).await;

    let mut handles = vec![];
    for i in 1..=20i64 {
        let db = Arc::clone(&db);
        let bidder = create_user(&db, "bidder", "bidder@example.com").await;
        let amount = format!("{}.00", 10 + i);
        let item_id = item.id;
        handles.push(tokio::spawn(async move {
            bidding::place_bid(&db, Principal { id: bidder.id }, item_id, &amount, Utc::now()).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            accepted += 1;
        }
    }

    // The ledger holds exactly the accepted bids, every accepted bid raised
    // the price, and the cached price is the ledger maximum.
    let bids = query::handlers::get_item_bids(&db, item.id).await.unwrap();
    assert_eq!(bids.len(), accepted);
    let reloaded = query::handlers::get_item(&db, item.id).await.unwrap();
    assert_eq!(reloaded.current_bid, Some(bids[0].amount));
    for pair in bids.windows(2) {
        assert!(pair[0].amount > pair[1].amount);
    }
}

// endregion: --- Bidding Tests

// region:    --- Closer Tests

#[tokio::test]
#[ignore = "requires a Postgres database via DATABASE_URL"]
async fn closing_picks_highest_bid_with_earliest_tie_break() {
    let db = setup().await;
    let owner = create_user(&db, "owner", "owner@example.com").await;
    let alice = create_user(&db, "alice", "alice@example.com").await;
    let bob = create_user(&db, "bob", "bob@example.com").await;
    let carol = create_user(&db, "carol", "carol@example.com").await;
    let item = create_item(&db, owner.id, dec!(10.00), Utc::now() - Duration::minutes(5)).await;

    let t0 = Utc::now() - Duration::hours(1);
    insert_bid_at(&db, item.id, alice.id, dec!(15.00), t0).await;
    insert_bid_at(&db, item.id, bob.id, dec!(20.00), t0 + Duration::minutes(1)).await;
    insert_bid_at(&db, item.id, carol.id, dec!(20.00), t0 + Duration::minutes(2)).await;

    let notifier = Arc::new(MockNotifier::default());
    let closer = AuctionCloser::new(db.get_pool(), Arc::clone(&notifier) as Arc<dyn Notifier>);
    closer.process_ended_auctions(Utc::now()).await.unwrap();

    let closed = query::handlers::get_item(&db, item.id).await.unwrap();
    assert!(closed.ended_processed);
    assert_eq!(closed.winner_id, Some(bob.id));
    assert_eq!(closed.winning_bid, Some(dec!(20.00)));
    assert!(closed.winner_notified_at.is_some());
    assert_eq!(notifier.sent_to(&bob.email), 1);

    let (_, subject, body) = notifier.sent.lock().unwrap().last().unwrap().clone();
    assert_eq!(subject, "You won the auction: Vintage lamp");
    assert!(body.contains("£20.00"));
}

#[tokio::test]
#[ignore = "requires a Postgres database via DATABASE_URL"]
async fn item_without_bids_closes_unsold() {
    let db = setup().await;
    let owner = create_user(&db, "owner", "owner@example.com").await;
    let item = create_item(&db, owner.id, dec!(10.00), Utc::now() - Duration::minutes(5)).await;

    let notifier = Arc::new(MockNotifier::default());
    let closer = AuctionCloser::new(db.get_pool(), Arc::clone(&notifier) as Arc<dyn Notifier>);
    closer.process_ended_auctions(Utc::now()).await.unwrap();

    let closed = query::handlers::get_item(&db, item.id).await.unwrap();
    assert!(closed.ended_processed);
    assert_eq!(closed.winner_id, None);
    assert_eq!(closed.winning_bid, None);
    assert!(closed.winner_notified_at.is_none());
    assert!(notifier.sent.lock().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a Postgres database via DATABASE_URL"]
async fn winner_without_email_is_not_notified_but_item_still_closes() {
    let db = setup().await;
    let owner = create_user(&db, "owner", "owner@example.com").await;
    let bidder = create_user(&db, "bidder", "").await;
    let item = create_item(&db, owner.id, dec!(10.00), Utc::now() - Duration::minutes(5)).await;
    insert_bid_at(&db, item.id, bidder.id, dec!(12.00), Utc::now() - Duration::hours(1)).await;

    let notifier = Arc::new(MockNotifier::default());
    let closer = AuctionCloser::new(db.get_pool(), Arc::clone(&notifier) as Arc<dyn Notifier>);
    closer.process_ended_auctions(Utc::now()).await.unwrap();

    // No usable address: the send is skipped entirely, the item closes with
    // its winner recorded and no notification timestamp.
    let closed = query::handlers::get_item(&db, item.id).await.unwrap();
    assert!(closed.ended_processed);
    assert_eq!(closed.winner_id, Some(bidder.id));
    assert_eq!(closed.winning_bid, Some(dec!(12.00)));
    assert!(closed.winner_notified_at.is_none());
    assert_eq!(notifier.sent_to(""), 0);
}

#[tokio::test]
#[ignore = "requires a Postgres database via DATABASE_URL"]
async fn second_pass_never_touches_a_processed_item() {
    let db = setup().await;
    let owner = create_user(&db, "owner", "owner@example.com").await;
    let bidder = create_user(&db, "bidder", "bidder@example.com").await;
    let item = create_item(&db, owner.id, dec!(10.00), Utc::now() - Duration::minutes(5)).await;
    insert_bid_at(&db, item.id, bidder.id, dec!(12.00), Utc::now() - Duration::hours(1)).await;

    let notifier = Arc::new(MockNotifier::default());
    let closer = AuctionCloser::new(db.get_pool(), Arc::clone(&notifier) as Arc<dyn Notifier>);

    closer.process_ended_auctions(Utc::now()).await.unwrap();
    let first = query::handlers::get_item(&db, item.id).await.unwrap();
    let mails_after_first = notifier.sent_to(&bidder.email);

    closer.process_ended_auctions(Utc::now()).await.unwrap();
    let second = query::handlers::get_item(&db, item.id).await.unwrap();

    assert!(first.ended_processed);
    assert_eq!(second.winner_id, first.winner_id);
    assert_eq!(second.winning_bid, first.winning_bid);
    assert_eq!(second.winner_notified_at, first.winner_notified_at);
    assert_eq!(notifier.sent_to(&bidder.email), mails_after_first);
}

#[tokio::test]
#[ignore = "requires a Postgres database via DATABASE_URL"]
async fn notification_failure_still_marks_item_processed() {
    let db = setup().await;
    let owner = create_user(&db, "owner", "owner@example.com").await;
    let bidder = create_user(&db, "bidder", "bidder@example.com").await;
    let item = create_item(&db, owner.id, dec!(10.00), Utc::now() - Duration::minutes(5)).await;
    insert_bid_at(&db, item.id, bidder.id, dec!(12.00), Utc::now() - Duration::hours(1)).await;

    let closer = AuctionCloser::new(db.get_pool(), Arc::new(FailingNotifier));
    closer.process_ended_auctions(Utc::now()).await.unwrap();

    let closed = query::handlers::get_item(&db, item.id).await.unwrap();
    assert!(closed.ended_processed);
    assert_eq!(closed.winner_id, Some(bidder.id));
    assert_eq!(closed.winning_bid, Some(dec!(12.00)));
    // Delivery failed, so no notification timestamp, and no retry will happen.
    assert!(closed.winner_notified_at.is_none());
}

// endregion: --- Closer Tests

// region:    --- Question Tests

#[tokio::test]
#[ignore = "requires a Postgres database via DATABASE_URL"]
async fn only_the_item_owner_may_answer() {
    let db = setup().await;
    let owner = create_user(&db, "owner", "owner@example.com").await;
    let asker = create_user(&db, "asker", "asker@example.com").await;
    let item = create_item(&db, owner.id, dec!(10.00), Utc::now() + Duration::hours(1)).await;

    let question = questions::ask_question(
        &db,
        Principal { id: asker.id },
        item.id,
        "Does it still work?",
    )
    .await
    .unwrap();

    let err = questions::answer_question(
        &db,
        Principal { id: asker.id },
        question.id,
        "Yes, perfectly.",
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AuctionError::Authorization(_)));

    // Rejected answer left the question untouched.
    let reloaded = query::handlers::get_item_questions(&db, item.id)
        .await
        .unwrap();
    assert_eq!(reloaded[0].answer_text, None);
    assert_eq!(reloaded[0].answered_at, None);

    let answered = questions::answer_question(
        &db,
        Principal { id: owner.id },
        question.id,
        "Yes, perfectly.",
    )
    .await
    .unwrap();
    assert_eq!(answered.answer_text.as_deref(), Some("Yes, perfectly."));
    assert!(answered.answered_at.is_some());
}

#[tokio::test]
#[ignore = "requires a Postgres database via DATABASE_URL"]
async fn re_answering_overwrites() {
    let db = setup().await;
    let owner = create_user(&db, "owner", "owner@example.com").await;
    let asker = create_user(&db, "asker", "asker@example.com").await;
    let item = create_item(&db, owner.id, dec!(10.00), Utc::now() + Duration::hours(1)).await;

    let question =
        questions::ask_question(&db, Principal { id: asker.id }, item.id, "Colour?")
            .await
            .unwrap();

    questions::answer_question(&db, Principal { id: owner.id }, question.id, "Blue")
        .await
        .unwrap();
    let second =
        questions::answer_question(&db, Principal { id: owner.id }, question.id, "Green")
            .await
            .unwrap();

    assert_eq!(second.answer_text.as_deref(), Some("Green"));
}

// endregion: --- Question Tests
