//! Bulk definition refresh.

use std::future::Future;

use vocab_core::LexicalEntry;

use crate::error::Result;
use crate::services::lexical::Lexicon;

/// Where refreshed definitions are written.
pub trait DefinitionStore: Send + Sync {
    /// Replace a word's definition and synonyms. `false` when the word is gone.
    fn store_entry(
        &self,
        word_id: i64,
        entry: &LexicalEntry,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Outcome of a bulk refresh.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    pub updated_count: usize,
    pub failed_words: Vec<String>,
}

/// Look up every `(id, text)` pair and write each success immediately.
///
/// Lookup and store failures are recorded per word; the run always finishes.
/// Words deleted while the refresh runs are skipped.
pub async fn refresh_words<D, L>(store: &D, lexicon: &L, words: Vec<(i64, String)>) -> RefreshReport
where
    D: DefinitionStore,
    L: Lexicon,
{
    let mut report = RefreshReport::default();

    for (word_id, text) in words {
        let entry = match lexicon.lookup(&text).await {
            Ok(entry) => entry,
            Err(_) => {
                report.failed_words.push(text);
                continue;
            }
        };

        match store.store_entry(word_id, &entry).await {
            Ok(true) => report.updated_count += 1,
            Ok(false) => tracing::info!("Skipping '{}', deleted during refresh", text),
            Err(e) => {
                tracing::error!("Could not store refreshed definition for '{}': {}", text, e);
                report.failed_words.push(text);
            }
        }
    }

    tracing::info!(
        "Refreshed {} words, {} failed",
        report.updated_count,
        report.failed_words.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::services::lexical::LookupError;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Stores entries for known ids; one id fails with a store error.
    struct MemoryStore {
        known: Vec<i64>,
        broken: Option<i64>,
        stored: Mutex<HashMap<i64, LexicalEntry>>,
    }

    impl MemoryStore {
        fn new(known: Vec<i64>, broken: Option<i64>) -> Self {
            Self {
                known,
                broken,
                stored: Mutex::new(HashMap::new()),
            }
        }
    }

    impl DefinitionStore for MemoryStore {
        async fn store_entry(&self, word_id: i64, entry: &LexicalEntry) -> Result<bool> {
            if self.broken == Some(word_id) {
                return Err(ApiError::Internal("update rejected".to_string()));
            }
            if !self.known.contains(&word_id) {
                return Ok(false);
            }
            self.stored.lock().unwrap().insert(word_id, entry.clone());
            Ok(true)
        }
    }

    struct FakeLexicon {
        missing: Vec<&'static str>,
    }

    impl Lexicon for FakeLexicon {
        async fn lookup(&self, word: &str) -> std::result::Result<LexicalEntry, LookupError> {
            if self.missing.contains(&word) {
                return Err(LookupError::NotFound(word.to_string()));
            }
            Ok(LexicalEntry::new(format!("meaning of {word}"), ["synonym"]))
        }
    }

    fn words(rows: &[(i64, &str)]) -> Vec<(i64, String)> {
        rows.iter().map(|(id, w)| (*id, w.to_string())).collect()
    }

    #[tokio::test]
    async fn store_error_does_not_stop_the_run() {
        let store = MemoryStore::new(vec![1, 2, 3], Some(2));
        let lexicon = FakeLexicon { missing: vec![] };

        let report = refresh_words(&store, &lexicon, words(&[(1, "aaa"), (2, "bbad"), (3, "ccc")])).await;

        assert_eq!(
            report,
            RefreshReport {
                updated_count: 2,
                failed_words: vec!["bbad".to_string()],
            }
        );
        let stored = store.stored.lock().unwrap();
        assert_eq!(stored[&3].definition, "meaning of ccc");
    }

    #[tokio::test]
    async fn deleted_words_are_not_counted() {
        let store = MemoryStore::new(vec![1], None);
        let lexicon = FakeLexicon { missing: vec![] };

        let report = refresh_words(&store, &lexicon, words(&[(1, "kept"), (9, "gone")])).await;

        assert_eq!(report.updated_count, 1);
        assert!(report.failed_words.is_empty());
    }

    #[tokio::test]
    async fn lookup_failures_are_listed() {
        let store = MemoryStore::new(vec![1, 2], None);
        let lexicon = FakeLexicon { missing: vec!["qwzx"] };

        let report = refresh_words(&store, &lexicon, words(&[(1, "qwzx"), (2, "terse")])).await;

        assert_eq!(report.updated_count, 1);
        assert_eq!(report.failed_words, vec!["qwzx".to_string()]);
        assert!(!store.stored.lock().unwrap().contains_key(&1));
    }
}
