// region:    --- Imports
use crate::auth::Principal;
use crate::database::DatabaseManager;
use crate::error::AuctionError;
use crate::models::User;
use crate::query::queries;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

// region:    --- Command

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileCommand {
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_image: Option<String>,
}

pub async fn update_profile(
    db_manager: &DatabaseManager,
    principal: Principal,
    cmd: UpdateProfileCommand,
) -> Result<User, AuctionError> {
    info!("{:<12} --> update profile: user {}", "Profile", principal.id);

    if let Some(email) = &cmd.email {
        if !email.contains('@') {
            return Err(AuctionError::Validation(format!(
                "'{email}' is not an email address"
            )));
        }
    }

    db_manager
        .transaction(move |tx| {
            Box::pin(async move {
                sqlx::query_as::<_, User>(queries::UPDATE_PROFILE)
                    .bind(&cmd.email)
                    .bind(cmd.date_of_birth)
                    .bind(&cmd.profile_image)
                    .bind(principal.id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or(AuctionError::NotFound("user"))
            })
        })
        .await
}

// endregion: --- Command
