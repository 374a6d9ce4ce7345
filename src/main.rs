// region:    --- Imports
use auction_house::closer::AuctionCloser;
use auction_house::config::Config;
use auction_house::database::DatabaseManager;
use auction_house::handlers;
use auction_house::notifier::HttpMailer;
use auction_house::scheduler::CloserScheduler;
use axum::{
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

// endregion: --- Imports

// region:    --- Main

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = Config::from_env();

    let db_manager = Arc::new(DatabaseManager::new(&config.database_url).await?);
    if let Err(e) = db_manager.initialize_database().await {
        error!("{:<12} --> schema initialization failed: {:?}", "Main", e);
        return Err(e.into());
    }
    info!("{:<12} --> schema ready", "Main");

    let mailer = Arc::new(HttpMailer::new(
        config.mail_gateway_url.clone(),
        config.mail_from.clone(),
    ));
    let closer = Arc::new(AuctionCloser::new(db_manager.get_pool(), mailer));

    // `close-auctions` runs one closer pass and exits, for cron-style setups.
    if std::env::args().nth(1).as_deref() == Some("close-auctions") {
        let count = closer.process_ended_auctions(Utc::now()).await?;
        println!("Processed {count} ended auctions.");
        return Ok(());
    }

    let scheduler = CloserScheduler::new(Arc::clone(&closer), config.closer_interval_secs);
    scheduler.start();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes_all = Router::new()
        .route("/health", get(handlers::handle_health))
        .route(
            "/items",
            get(handlers::handle_get_items).post(handlers::handle_create_item),
        )
        .route("/items/:id", get(handlers::handle_get_item))
        .route(
            "/items/:id/bids",
            get(handlers::handle_get_item_bids).post(handlers::handle_place_bid),
        )
        .route(
            "/items/:id/questions",
            get(handlers::handle_get_item_questions).post(handlers::handle_ask_question),
        )
        .route(
            "/questions/:id/answer",
            post(handlers::handle_answer_question),
        )
        .route(
            "/profile",
            get(handlers::handle_get_profile).put(handlers::handle_update_profile),
        )
        .layer(cors)
        .with_state(db_manager);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!(
        "{:<12} --> Web Server: Listening on {}",
        "Main",
        listener.local_addr()?
    );

    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
    }
    Ok(())
}

// endregion: --- Main
