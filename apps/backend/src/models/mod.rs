//! Database models and API types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub use vocab_core::types::{LexicalEntry, ReviewCounters, SessionResult, Word};
pub use vocab_core::ImportStats;

use crate::services::lexical::LookupFailure;

// === Database Entity Types ===

/// Word stored in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbWord {
    pub id: i64,
    pub text: String,
    pub group_name: String,
    pub definition: Option<String>,
    pub synonyms: Vec<String>,
    pub correct_count: i32,
    pub incorrect_count: i32,
    pub last_incorrect: Option<DateTime<Utc>>,
    pub last_tested: Option<DateTime<Utc>>,
    pub flagged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbWord {
    pub fn counters(&self) -> ReviewCounters {
        ReviewCounters {
            correct_count: self.correct_count.max(0) as u32,
            incorrect_count: self.incorrect_count.max(0) as u32,
            last_incorrect: self.last_incorrect,
        }
    }

    /// Convert to vocab-core Word
    pub fn to_core_word(&self) -> Word {
        Word {
            id: self.id,
            text: self.text.clone(),
            group: self.group_name.clone(),
            definition: self.definition.clone(),
            synonyms: self.synonyms.clone(),
            counters: self.counters(),
            last_tested: self.last_tested,
            flagged: self.flagged,
        }
    }

    /// Convert to the word list summary
    pub fn to_summary(&self) -> WordSummary {
        WordSummary {
            id: self.id,
            word: self.text.clone(),
            group: self.group_name.clone(),
            meaning: self.definition.clone(),
            synonyms: self.synonyms.clone(),
            correct_count: self.correct_count,
            incorrect_count: self.incorrect_count,
            last_tested: self.last_tested,
            flagged: self.flagged,
        }
    }
}

/// Quiz session in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbQuizSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub groups: Vec<String>,
    pub requested_count: i32,
    pub total_words: i32,
    pub correct_words: Option<i32>,
}

impl DbQuizSession {
    /// Completed sessions only; open sessions have nothing to report yet.
    pub fn to_session_result(&self) -> Option<SessionResult> {
        Some(SessionResult {
            started_at: self.started_at,
            ended_at: self.ended_at?,
            total_words: self.total_words.max(0) as u32,
            correct_words: self.correct_words?.max(0) as u32,
        })
    }

    pub fn to_result_response(&self) -> SessionResultResponse {
        let correct_words = self.correct_words.unwrap_or(0);
        SessionResultResponse {
            session_id: self.id,
            total_words: self.total_words,
            correct_words,
            accuracy: vocab_core::stats::session_accuracy(
                self.total_words.max(0) as u32,
                correct_words.max(0) as u32,
            )
            .unwrap_or(0.0),
            completed_at: self.ended_at,
        }
    }
}

/// Word about to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWord {
    pub text: String,
    pub group: String,
    pub definition: Option<String>,
    pub synonyms: Vec<String>,
}

impl NewWord {
    pub fn from_lookup(text: String, group: String, entry: Option<LexicalEntry>) -> Self {
        match entry {
            Some(entry) => Self {
                text,
                group,
                definition: Some(entry.definition),
                synonyms: entry.synonyms,
            },
            None => Self {
                text,
                group,
                definition: None,
                synonyms: Vec::new(),
            },
        }
    }
}

// === API Request/Response Types ===

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// Word types
#[derive(Debug, Serialize, Deserialize)]
pub struct WordsQuery {
    pub search: Option<String>,
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordSummary {
    pub id: i64,
    pub word: String,
    pub group: String,
    pub meaning: Option<String>,
    pub synonyms: Vec<String>,
    pub correct_count: i32,
    pub incorrect_count: i32,
    pub last_tested: Option<DateTime<Utc>>,
    pub flagged: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateWordRequest {
    pub word: String,
    pub group: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateWordRequest {
    pub meaning: Option<String>,
    pub synonyms: Option<Vec<String>>,
    pub group: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewWord {
    pub id: i64,
    pub word: String,
    pub group: String,
    pub meaning: Option<String>,
    pub incorrect_count: u32,
    pub last_incorrect: Option<DateTime<Utc>>,
}

impl From<Word> for ReviewWord {
    fn from(word: Word) -> Self {
        Self {
            id: word.id,
            word: word.text,
            group: word.group,
            meaning: word.definition,
            incorrect_count: word.counters.incorrect_count,
            last_incorrect: word.counters.last_incorrect,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub word_id: i64,
    pub refreshed: bool,
    pub meaning: Option<String>,
    pub synonyms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<LookupFailure>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshAllResponse {
    pub message: String,
    pub updated_count: usize,
    pub failed_words: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub message: String,
    pub deleted_count: u64,
}

// Flag types
#[derive(Debug, Serialize, Deserialize)]
pub struct FlagWordsRequest {
    pub word_ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlagWordsResponse {
    pub flagged_count: u64,
}

// Quiz types
#[derive(Debug, Serialize, Deserialize)]
pub struct StartQuizRequest {
    pub groups: Vec<String>,
    pub word_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizWord {
    pub id: i64,
    pub word: String,
    pub meaning: Option<String>,
    pub synonyms: Vec<String>,
    pub session_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitAnswerRequest {
    pub word_id: i64,
    pub correct: bool,
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub message: String,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub mastered: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CompleteSessionRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResultResponse {
    pub session_id: Uuid,
    pub total_words: i32,
    pub correct_words: i32,
    pub accuracy: f64,
    pub completed_at: Option<DateTime<Utc>>,
}

// Stats types
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct WordCounts {
    pub total_words: i64,
    pub words_to_review: i64,
    pub groups: i64,
    pub words_mastered: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_words: i64,
    pub words_to_review: i64,
    pub groups: i64,
    pub words_mastered: i64,
    pub total_tests: usize,
    pub average_accuracy: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub session_id: Uuid,
    pub date: DateTime<Utc>,
    pub words_tested: i32,
    pub correct: i32,
    pub accuracy: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccuracyPoint {
    pub date: NaiveDate,
    pub accuracy: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VolumePoint {
    pub date: NaiveDate,
    pub words: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub total_tests: usize,
    pub average_accuracy: f64,
    pub words_mastered: i64,
    pub recent_activity: Vec<ActivityEntry>,
    pub accuracy_trend: Vec<AccuracyPoint>,
    pub words_per_day: Vec<VolumePoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProblematicWord {
    pub id: i64,
    pub word: String,
    pub group: String,
    pub incorrect_count: u32,
    pub correct_count: u32,
    pub last_tested: Option<DateTime<Utc>>,
    pub accuracy: f64,
}

impl From<Word> for ProblematicWord {
    fn from(word: Word) -> Self {
        Self {
            accuracy: vocab_core::stats::word_accuracy(
                word.counters.correct_count,
                word.counters.incorrect_count,
            ),
            id: word.id,
            word: word.text,
            group: word.group,
            incorrect_count: word.counters.incorrect_count,
            correct_count: word.counters.correct_count,
            last_tested: word.last_tested,
        }
    }
}

// Upload types
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub message: String,
    pub stats: ImportStats,
    pub failed_words: Vec<String>,
}

// Health types
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub environment: String,
}
