//! Quiz endpoints

use axum::{extract::State, Json};
use vocab_core::QuizRequest;

use crate::error::Result;
use crate::models::*;
use crate::routes::ApiJson;
use crate::AppState;

/// POST /api/test
/// Start a quiz over the requested groups
pub async fn start(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<StartQuizRequest>,
) -> Result<Json<Vec<QuizWord>>> {
    let request = QuizRequest::new(payload.groups, payload.word_count)?;
    let (session_id, words) = state.db.start_quiz(&request).await?;

    Ok(Json(
        words
            .into_iter()
            .map(|w| QuizWord {
                id: w.id,
                word: w.text,
                meaning: w.definition,
                synonyms: w.synonyms,
                session_id,
            })
            .collect(),
    ))
}

/// POST /api/answer
pub async fn answer(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SubmitAnswerRequest>,
) -> Result<Json<AnswerResponse>> {
    let counters = state
        .db
        .record_answer(payload.word_id, payload.correct, payload.session_id)
        .await?;

    Ok(Json(AnswerResponse {
        message: "Answer recorded".to_string(),
        correct_count: counters.correct_count,
        incorrect_count: counters.incorrect_count,
        mastered: counters.is_mastered(),
    }))
}

/// POST /api/test-complete
pub async fn complete(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CompleteSessionRequest>,
) -> Result<Json<SessionResultResponse>> {
    let session = state.db.complete_session(payload.session_id).await?;
    Ok(Json(session.to_result_response()))
}
