//! Lexical lookup client.
//!
//! A [`LexicalSource`] makes one request to the dictionary. [`LookupClient`]
//! wraps a source with exponential backoff: transient failures are retried
//! with delays of 1s, 2s, 4s, ... capped at 30s, until the elapsed budget is
//! spent. A definitive "not found" is returned at once.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::Instant;
use vocab_core::LexicalEntry;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of a single fetch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("word not found")]
    NotFound,

    #[error("transient failure: {0}")]
    Transient(String),
}

/// Outcome of a lookup after retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no definition found for '{0}'")]
    NotFound(String),

    #[error("lexical source unavailable for '{word}' after {attempts} attempts: {last_error}")]
    Unavailable {
        word: String,
        attempts: u32,
        last_error: String,
    },
}

/// Machine-readable failure kind reported inside refresh responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupFailure {
    NotFound,
    Unavailable,
}

impl LookupError {
    pub fn failure(&self) -> LookupFailure {
        match self {
            LookupError::NotFound(_) => LookupFailure::NotFound,
            LookupError::Unavailable { .. } => LookupFailure::Unavailable,
        }
    }
}

/// One-shot access to a dictionary.
pub trait LexicalSource: Send + Sync {
    fn fetch(&self, word: &str) -> impl Future<Output = Result<LexicalEntry, FetchError>> + Send;
}

/// Word lookup as seen by callers: retries already applied.
pub trait Lexicon: Send + Sync {
    fn lookup(&self, word: &str) -> impl Future<Output = Result<LexicalEntry, LookupError>> + Send;
}

/// Backoff parameters for [`LookupClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_elapsed: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_elapsed(max_elapsed: Duration) -> Self {
        Self {
            max_elapsed,
            ..Self::default()
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            next: self.initial_delay,
            max: self.max_delay,
        }
    }
}

/// Doubling delay sequence.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.next.min(self.max);
        self.next = delay.saturating_mul(2).min(self.max);
        Some(delay)
    }
}

/// Retrying wrapper around a [`LexicalSource`].
pub struct LookupClient<S> {
    source: S,
    policy: RetryPolicy,
}

impl<S: LexicalSource> LookupClient<S> {
    pub fn new(source: S, policy: RetryPolicy) -> Self {
        Self { source, policy }
    }
}

impl<S: LexicalSource> Lexicon for LookupClient<S> {
    async fn lookup(&self, word: &str) -> Result<LexicalEntry, LookupError> {
        let started = Instant::now();
        let mut delays = self.policy.backoff();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let reason = match self.source.fetch(word).await {
                Ok(entry) => return Ok(entry),
                Err(FetchError::NotFound) => {
                    tracing::info!("No definition found for '{}'", word);
                    return Err(LookupError::NotFound(word.to_string()));
                }
                Err(FetchError::Transient(reason)) => reason,
            };

            let elapsed = started.elapsed();
            if elapsed >= self.policy.max_elapsed {
                tracing::warn!(
                    "Giving up on '{}' after {} attempts in {:?}: {}",
                    word,
                    attempts,
                    elapsed,
                    reason
                );
                return Err(LookupError::Unavailable {
                    word: word.to_string(),
                    attempts,
                    last_error: reason,
                });
            }

            // Never sleep past the budget; the last attempt lands on it exactly.
            let remaining = self.policy.max_elapsed - elapsed;
            let delay = delays.next().unwrap_or(self.policy.max_delay).min(remaining);
            tracing::warn!(
                "Lookup attempt {} for '{}' failed: {}. Retrying in {:?}",
                attempts,
                word,
                reason,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}

// === Free Dictionary API ===

#[derive(Debug, Deserialize)]
struct DictionaryEntry {
    #[serde(default)]
    meanings: Vec<DictionaryMeaning>,
}

#[derive(Debug, Deserialize)]
struct DictionaryMeaning {
    #[serde(default)]
    definitions: Vec<DictionaryDefinition>,
    #[serde(default)]
    synonyms: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DictionaryDefinition {
    #[serde(default)]
    definition: String,
    #[serde(default)]
    synonyms: Vec<String>,
}

/// First definition of the response plus the union of synonyms across every
/// sense and every entry.
fn entry_from_response(entries: &[DictionaryEntry]) -> Option<LexicalEntry> {
    let definition = entries
        .iter()
        .flat_map(|e| &e.meanings)
        .flat_map(|m| &m.definitions)
        .map(|d| d.definition.trim())
        .find(|d| !d.is_empty())?;

    let synonyms = entries.iter().flat_map(|e| &e.meanings).flat_map(|m| {
        m.synonyms
            .iter()
            .chain(m.definitions.iter().flat_map(|d| &d.synonyms))
    });

    Some(LexicalEntry::new(definition, synonyms))
}

/// HTTP source backed by the Free Dictionary API (or any endpoint with the
/// same response shape).
pub struct DictionaryApi {
    client: reqwest::Client,
    base_url: reqwest::Url,
}

impl DictionaryApi {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url = reqwest::Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("lexical API URL cannot be a base: {}", base_url);
        }
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, base_url })
    }

    fn word_url(&self, word: &str) -> reqwest::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(word);
        }
        url
    }
}

impl LexicalSource for DictionaryApi {
    async fn fetch(&self, word: &str) -> Result<LexicalEntry, FetchError> {
        let response = self
            .client
            .get(self.word_url(word))
            .send()
            .await
            .map_err(|e| FetchError::Transient(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Transient(format!("HTTP {}", status)));
        }

        let entries: Vec<DictionaryEntry> = response
            .json()
            .await
            .map_err(|e| FetchError::Transient(e.to_string()))?;

        entry_from_response(&entries).ok_or(FetchError::NotFound)
    }
}

/// Lookup client used by the running service.
pub type Dictionary = LookupClient<DictionaryApi>;
