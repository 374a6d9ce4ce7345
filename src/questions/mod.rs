// region:    --- Imports
use crate::auth::Principal;
use crate::database::DatabaseManager;
use crate::error::AuctionError;
use crate::models::ItemQuestion;
use crate::query::queries;
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

// endregion: --- Imports

// region:    --- Commands

#[derive(Debug, Deserialize)]
pub struct AskQuestionCommand {
    pub question_text: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerQuestionCommand {
    pub answer_text: String,
}

fn non_empty(field: &'static str, text: &str) -> Result<String, AuctionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AuctionError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Ask a question about an item. Any authenticated user may ask.
pub async fn ask_question(
    db_manager: &DatabaseManager,
    principal: Principal,
    item_id: i64,
    question_text: &str,
) -> Result<ItemQuestion, AuctionError> {
    info!(
        "{:<12} --> ask question: item {} by user {}",
        "Questions", item_id, principal.id
    );
    let text = non_empty("question text", question_text)?;

    db_manager
        .transaction(move |tx| {
            Box::pin(async move {
                // The insert would also fail on the foreign key, but a typed
                // not-found beats surfacing a constraint violation.
                sqlx::query_scalar::<_, i64>(queries::ITEM_EXISTS)
                    .bind(item_id)
                    .fetch_optional(&mut **tx)
                    .await?
                    .ok_or(AuctionError::NotFound("item"))?;

                let question = sqlx::query_as::<_, ItemQuestion>(queries::INSERT_QUESTION)
                    .bind(item_id)
                    .bind(principal.id)
                    .bind(&text)
                    .fetch_one(&mut **tx)
                    .await?;
                Ok(question)
            })
        })
        .await
}

/// Answer a question. Only the owner of the question's item may answer;
/// answering again overwrites the previous answer, no history is kept.
pub async fn answer_question(
    db_manager: &DatabaseManager,
    principal: Principal,
    question_id: i64,
    answer_text: &str,
) -> Result<ItemQuestion, AuctionError> {
    info!(
        "{:<12} --> answer question: {} by user {}",
        "Questions", question_id, principal.id
    );
    let text = non_empty("answer text", answer_text)?;

    db_manager
        .transaction(move |tx| {
            Box::pin(async move {
                let owner_id =
                    sqlx::query_scalar::<_, i64>(queries::GET_QUESTION_ITEM_OWNER)
                        .bind(question_id)
                        .fetch_optional(&mut **tx)
                        .await?
                        .ok_or(AuctionError::NotFound("question"))?;

                if owner_id != principal.id {
                    return Err(AuctionError::Authorization(
                        "only the item owner may answer questions".to_string(),
                    ));
                }

                let question = sqlx::query_as::<_, ItemQuestion>(queries::ANSWER_QUESTION)
                    .bind(&text)
                    .bind(Utc::now())
                    .bind(question_id)
                    .fetch_one(&mut **tx)
                    .await?;
                Ok(question)
            })
        })
        .await
}

// endregion: --- Commands

// region:    --- Tests


// endregion: --- Tests
