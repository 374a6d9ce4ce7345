// region:    --- Imports
use crate::error::AuctionError;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

// endregion: --- Imports

// region:    --- Principal

/// The authenticated caller, threaded explicitly through every core operation.
/// Session handling lives in front of this service; it forwards the user id in
/// the `x-user-id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: i64,
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AuctionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .map(|id| Principal { id })
            .ok_or_else(|| {
                AuctionError::Authorization("missing or malformed x-user-id header".to_string())
            })
    }
}

// endregion: --- Principal
