pub mod auth;
pub mod bidding;
pub mod closer;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod models;
pub mod notifier;
pub mod profile;
pub mod query;
pub mod questions;
pub mod scheduler;
