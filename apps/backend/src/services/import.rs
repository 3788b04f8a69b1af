//! Bulk word import.
//!
//! Rows are reconciled one at a time against the catalog. Existing words are
//! skipped or regrouped; new words are looked up and buffered, then written in
//! batches of [`IMPORT_BATCH_SIZE`]. Each batch commits on its own, so a
//! failure part-way keeps the batches already written.

use std::future::Future;

use vocab_core::{ImportRow, ImportStats, IMPORT_BATCH_SIZE};

use crate::error::{ApiError, Result};
use crate::models::NewWord;
use crate::services::lexical::Lexicon;

/// Store operations the importer needs.
pub trait WordCatalog: Send + Sync {
    /// Group of the word with this text, if it exists.
    fn find_group(&self, text: &str) -> impl Future<Output = Result<Option<String>>> + Send;

    fn reassign_group(&self, text: &str, group: &str) -> impl Future<Output = Result<()>> + Send;

    /// Insert a batch in one transaction.
    fn insert_words(&self, words: &[NewWord]) -> impl Future<Output = Result<u64>> + Send;
}

/// Result of a completed import.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub stats: ImportStats,
    pub failed_words: Vec<String>,
}

impl ImportReport {
    fn abort(self, source: ApiError) -> ApiError {
        ApiError::ImportAborted {
            message: source.to_string(),
            stats: self.stats,
            failed_words: self.failed_words,
        }
    }
}

/// Import `(word, group)` pairs. Store failures abort the run and surface as
/// [`ApiError::ImportAborted`]. Its counts cover committed batches only: new
/// words are counted as processed or failed when their batch is written.
pub async fn import_pairs<C, L, I>(catalog: &C, lexicon: &L, pairs: I) -> Result<ImportReport>
where
    C: WordCatalog,
    L: Lexicon,
    I: IntoIterator<Item = (String, String)>,
{
    let mut report = ImportReport::default();
    let mut pending: Vec<NewWord> = Vec::with_capacity(IMPORT_BATCH_SIZE);

    for (word, group) in pairs {
        let Some(row) = ImportRow::normalize(&word, &group) else {
            continue;
        };

        // The same word may appear twice in one file before its batch is written.
        if let Some(queued) = pending.iter_mut().find(|w| w.text == row.word) {
            if queued.group == row.group {
                report.stats.skipped += 1;
            } else {
                queued.group = row.group;
                report.stats.updated += 1;
            }
            continue;
        }

        let existing = match catalog.find_group(&row.word).await {
            Ok(existing) => existing,
            Err(e) => return Err(report.abort(e)),
        };

        match existing {
            Some(current) if current == row.group => report.stats.skipped += 1,
            Some(_) => {
                if let Err(e) = catalog.reassign_group(&row.word, &row.group).await {
                    return Err(report.abort(e));
                }
                report.stats.updated += 1;
            }
            None => {
                let entry = match lexicon.lookup(&row.word).await {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        tracing::info!("Importing '{}' without a definition: {}", row.word, e);
                        None
                    }
                };
                pending.push(NewWord::from_lookup(row.word, row.group, entry));

                if pending.len() >= IMPORT_BATCH_SIZE {
                    let flushed = flush(catalog, &mut pending, &mut report).await;
                    if let Err(e) = flushed {
                        return Err(report.abort(e));
                    }
                }
            }
        }
    }

    if !pending.is_empty() {
        let flushed = flush(catalog, &mut pending, &mut report).await;
        if let Err(e) = flushed {
            return Err(report.abort(e));
        }
    }

    Ok(report)
}

/// Write the pending batch, then count its words as processed or failed.
/// Nothing is counted for a batch that did not commit.
async fn flush<C: WordCatalog>(
    catalog: &C,
    pending: &mut Vec<NewWord>,
    report: &mut ImportReport,
) -> Result<()> {
    let inserted = catalog.insert_words(pending).await?;
    tracing::info!("Flushed import batch of {} words ({} inserted)", pending.len(), inserted);

    for word in pending.drain(..) {
        if word.definition.is_some() {
            report.stats.processed += 1;
        } else {
            report.stats.failed += 1;
            report.failed_words.push(word.text);
        }
    }
    Ok(())
}
