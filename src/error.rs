// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Error

/// Closed error taxonomy for every core operation. Handlers map these to
/// status codes; nothing above this layer sees raw database or transport text.
#[derive(Debug, Error)]
pub enum AuctionError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("bid must exceed the current price of {current}")]
    LowBid { current: Decimal },

    #[error("auction has already ended")]
    AlreadyEnded,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuctionError {
    /// Stable machine-readable code carried in error payloads.
    pub fn code(&self) -> &'static str {
        match self {
            AuctionError::Validation(_) => "INVALID_INPUT",
            AuctionError::Authorization(_) => "NOT_AUTHORIZED",
            AuctionError::LowBid { .. } => "LOW_BID",
            AuctionError::AlreadyEnded => "ALREADY_ENDED",
            AuctionError::NotFound(_) => "NOT_FOUND",
            AuctionError::Transport(_) => "TRANSPORT_FAILED",
            AuctionError::Database(_) => "DATABASE_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AuctionError::Validation(_) => StatusCode::BAD_REQUEST,
            AuctionError::Authorization(_) => StatusCode::FORBIDDEN,
            AuctionError::LowBid { .. } => StatusCode::BAD_REQUEST,
            AuctionError::AlreadyEnded => StatusCode::BAD_REQUEST,
            AuctionError::NotFound(_) => StatusCode::NOT_FOUND,
            AuctionError::Transport(_) => StatusCode::BAD_GATEWAY,
            AuctionError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuctionError {
    fn into_response(self) -> Response {
        let mut body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        // Callers resubmitting a bid need the threshold they have to beat.
        if let AuctionError::LowBid { current } = &self {
            body["current_price"] = serde_json::json!(current);
        }
        (self.status(), Json(body)).into_response()
    }
}

// endregion: --- Error

// region:    --- Tests


// endregion: --- Tests
