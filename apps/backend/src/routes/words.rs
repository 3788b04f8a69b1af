//! Word endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use vocab_core::{review_priority, types::normalize_synonyms, ImportRow};

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::{ApiJson, ApiPath, ApiQuery};
use crate::services::lexical::Lexicon;
use crate::services::refresh::refresh_words;
use crate::AppState;

fn word_not_found(word_id: i64) -> ApiError {
    ApiError::NotFound(format!("word {word_id}"))
}

/// GET /api/groups
pub async fn groups(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    Ok(Json(state.db.list_groups().await?))
}

/// GET /api/words
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<WordsQuery>,
) -> Result<Json<Vec<WordSummary>>> {
    let words = state
        .db
        .list_words(query.search.as_deref(), query.group.as_deref())
        .await?;
    Ok(Json(words.iter().map(DbWord::to_summary).collect()))
}

/// POST /api/words
/// Add one word by hand, looking up its definition
pub async fn create(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateWordRequest>,
) -> Result<(StatusCode, Json<WordSummary>)> {
    let row = ImportRow::normalize(&payload.word, &payload.group)
        .ok_or_else(|| ApiError::BadRequest("word and group must not be empty".to_string()))?;

    let entry = match state.lexicon.lookup(&row.word).await {
        Ok(entry) => Some(entry),
        Err(e) => {
            tracing::info!("Creating '{}' without a definition: {}", row.word, e);
            None
        }
    };

    let word = state
        .db
        .create_word(&NewWord::from_lookup(row.word, row.group, entry))
        .await?;
    Ok((StatusCode::CREATED, Json(word.to_summary())))
}

/// PUT /api/words/:id
pub async fn update(
    State(state): State<AppState>,
    ApiPath(word_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<UpdateWordRequest>,
) -> Result<Json<WordSummary>> {
    let group = match payload.group {
        Some(group) if group.trim().is_empty() => {
            return Err(ApiError::BadRequest("group must not be empty".to_string()))
        }
        Some(group) => Some(group.trim().to_string()),
        None => None,
    };
    let meaning = payload.meaning.map(|m| m.trim().to_string());
    let synonyms = payload.synonyms.map(normalize_synonyms);

    let word = state
        .db
        .update_word(word_id, meaning, synonyms, group)
        .await?
        .ok_or_else(|| word_not_found(word_id))?;
    Ok(Json(word.to_summary()))
}

/// DELETE /api/words/:id
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(word_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>> {
    if !state.db.delete_word(word_id).await? {
        return Err(word_not_found(word_id));
    }
    Ok(Json(MessageResponse::new("Word deleted")))
}

/// DELETE /api/words/delete-all
pub async fn delete_all(State(state): State<AppState>) -> Result<Json<DeletedResponse>> {
    let deleted_count = state.db.delete_all_words().await?;
    tracing::info!("Deleted all {} words", deleted_count);
    Ok(Json(DeletedResponse {
        message: "All words deleted".to_string(),
        deleted_count,
    }))
}

/// POST /api/words/:id/refresh
/// Re-fetch one word's definition. Lookup failures keep the stored values.
pub async fn refresh(
    State(state): State<AppState>,
    ApiPath(word_id): ApiPath<i64>,
) -> Result<Json<RefreshResponse>> {
    let word = state
        .db
        .get_word(word_id)
        .await?
        .ok_or_else(|| word_not_found(word_id))?;

    let response = match state.lexicon.lookup(&word.text).await {
        Ok(entry) => {
            let updated = state
                .db
                .set_lexical_entry(word_id, &entry)
                .await?
                .ok_or_else(|| word_not_found(word_id))?;
            RefreshResponse {
                word_id,
                refreshed: true,
                meaning: updated.definition,
                synonyms: updated.synonyms,
                failure: None,
            }
        }
        Err(e) => RefreshResponse {
            word_id,
            refreshed: false,
            failure: Some(e.failure()),
            meaning: word.definition,
            synonyms: word.synonyms,
        },
    };

    Ok(Json(response))
}

/// POST /api/words/refresh-all
pub async fn refresh_all(State(state): State<AppState>) -> Result<Json<RefreshAllResponse>> {
    let words = state
        .db
        .all_words()
        .await?
        .into_iter()
        .map(|w| (w.id, w.text))
        .collect();

    let report = refresh_words(state.db.as_ref(), state.lexicon.as_ref(), words).await;

    Ok(Json(RefreshAllResponse {
        message: format!("Refreshed {} words", report.updated_count),
        updated_count: report.updated_count,
        failed_words: report.failed_words,
    }))
}

/// GET /api/words-to-review
pub async fn to_review(State(state): State<AppState>) -> Result<Json<Vec<ReviewWord>>> {
    let mut words: Vec<Word> = state
        .db
        .words_to_review()
        .await?
        .iter()
        .map(DbWord::to_core_word)
        .collect();
    words.sort_by(review_priority);
    Ok(Json(words.into_iter().map(ReviewWord::from).collect()))
}

/// POST /api/flag-words
pub async fn flag(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<FlagWordsRequest>,
) -> Result<Json<FlagWordsResponse>> {
    let flagged_count = state.db.flag_words(&payload.word_ids).await?;
    Ok(Json(FlagWordsResponse { flagged_count }))
}

/// GET /api/flagged-words
pub async fn flagged(State(state): State<AppState>) -> Result<Json<Vec<WordSummary>>> {
    let words = state.db.flagged_words().await?;
    Ok(Json(words.iter().map(DbWord::to_summary).collect()))
}

/// POST /api/flagged-words/:id/resolve
pub async fn resolve_flag(
    State(state): State<AppState>,
    ApiPath(word_id): ApiPath<i64>,
) -> Result<Json<MessageResponse>> {
    if !state.db.resolve_flag(word_id).await? {
        return Err(word_not_found(word_id));
    }
    Ok(Json(MessageResponse::new("Flag resolved")))
}
