//! Core types for the vocabulary drill.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Spaced-repetition counters carried by every word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCounters {
    pub correct_count: u32,
    pub incorrect_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_incorrect: Option<DateTime<Utc>>,
}

/// A vocabulary word with its group, lexical data and counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub text: String,
    pub group: String,
    pub definition: Option<String>,
    pub synonyms: Vec<String>,
    #[serde(flatten)]
    pub counters: ReviewCounters,
    pub last_tested: Option<DateTime<Utc>>,
    pub flagged: bool,
}

/// Definition and synonyms returned by the lexical source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexicalEntry {
    pub definition: String,
    pub synonyms: Vec<String>,
}

impl LexicalEntry {
    pub fn new<I, S>(definition: impl Into<String>, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            definition: definition.into(),
            synonyms: normalize_synonyms(synonyms),
        }
    }
}

/// A completed quiz session, reduced to what the reporters need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub total_words: u32,
    pub correct_words: u32,
}

/// Trim, drop blanks and deduplicate. Output is sorted so that the stored
/// array behaves like a set.
pub fn normalize_synonyms<I, S>(synonyms: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    synonyms
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
