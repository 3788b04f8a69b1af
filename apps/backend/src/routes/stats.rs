//! Stats and history endpoints

use axum::{extract::State, Json};
use chrono::Utc;
use vocab_core::stats::{
    average_accuracy, daily_trend, problematic_words, session_accuracy, RECENT_ACTIVITY_LIMIT,
};

use crate::error::Result;
use crate::models::*;
use crate::AppState;

async fn session_results(state: &AppState) -> Result<(Vec<DbQuizSession>, Vec<SessionResult>)> {
    let sessions = state.db.completed_sessions().await?;
    let results = sessions
        .iter()
        .filter_map(DbQuizSession::to_session_result)
        .collect();
    Ok((sessions, results))
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let counts = state.db.word_counts().await?;
    let (_, results) = session_results(&state).await?;

    Ok(Json(StatsResponse {
        total_words: counts.total_words,
        words_to_review: counts.words_to_review,
        groups: counts.groups,
        words_mastered: counts.words_mastered,
        total_tests: results.len(),
        average_accuracy: average_accuracy(&results),
    }))
}

/// GET /api/history
pub async fn history(State(state): State<AppState>) -> Result<Json<HistoryResponse>> {
    let counts = state.db.word_counts().await?;
    let (sessions, results) = session_results(&state).await?;

    let recent_activity = sessions
        .iter()
        .rev()
        .take(RECENT_ACTIVITY_LIMIT)
        .filter_map(|s| {
            let correct = s.correct_words.unwrap_or(0);
            Some(ActivityEntry {
                session_id: s.id,
                date: s.ended_at?,
                words_tested: s.total_words,
                correct,
                accuracy: session_accuracy(s.total_words.max(0) as u32, correct.max(0) as u32)
                    .unwrap_or(0.0),
            })
        })
        .collect();

    let trend = daily_trend(&results, Utc::now());

    Ok(Json(HistoryResponse {
        total_tests: results.len(),
        average_accuracy: average_accuracy(&results),
        words_mastered: counts.words_mastered,
        recent_activity,
        accuracy_trend: trend
            .iter()
            .map(|p| AccuracyPoint {
                date: p.date,
                accuracy: p.accuracy,
            })
            .collect(),
        words_per_day: trend
            .iter()
            .map(|p| VolumePoint {
                date: p.date,
                words: p.words,
            })
            .collect(),
    }))
}

/// GET /api/problematic-words
pub async fn problematic(State(state): State<AppState>) -> Result<Json<Vec<ProblematicWord>>> {
    let candidates = state.db.words_to_review().await?;
    let words = problematic_words(candidates.iter().map(DbWord::to_core_word));
    Ok(Json(words.into_iter().map(ProblematicWord::from).collect()))
}

/// POST /api/reset-stats
pub async fn reset(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    state.db.reset_stats().await?;
    tracing::info!("Reset all word statistics");
    Ok(Json(MessageResponse::new("Statistics reset")))
}
