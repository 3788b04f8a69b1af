//! Import row handling for spreadsheet uploads.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};

/// New words are written to the store in batches of this size.
pub const IMPORT_BATCH_SIZE: usize = 30;

pub const WORD_COLUMN: &str = "word";
pub const GROUP_COLUMN: &str = "group_name";

/// A normalized (word, group) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    pub word: String,
    pub group: String,
}

impl ImportRow {
    /// Lower-case and trim the word, trim the group. Returns `None` when
    /// either field ends up empty; such rows are skipped silently.
    pub fn normalize(word: &str, group: &str) -> Option<Self> {
        let word = normalize_word(word);
        let group = group.trim().to_string();
        if word.is_empty() || group.is_empty() {
            return None;
        }
        Some(Self { word, group })
    }
}

/// Canonical form of a word's text, used as the dedup key.
pub fn normalize_word(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Counters reported back after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub processed: usize,
    pub skipped: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Positions of the required columns in a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub word: usize,
    pub group: usize,
}

impl ColumnMap {
    pub fn resolve<S: AsRef<str>>(header: &[S]) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.as_ref().trim().eq_ignore_ascii_case(name))
        };

        match (find(WORD_COLUMN), find(GROUP_COLUMN)) {
            (Some(word), Some(group)) => Ok(Self { word, group }),
            _ => Err(ValidationError::MissingColumns(vec![
                WORD_COLUMN.to_string(),
                GROUP_COLUMN.to_string(),
            ])),
        }
    }
}

/// Turn a sheet grid (header row first) into raw (word, group) pairs.
/// Short rows yield empty cells and are later skipped by normalization.
pub fn pairs_from_grid(grid: Vec<Vec<String>>) -> Result<Vec<(String, String)>> {
    let mut rows = grid.into_iter();
    let header = rows.next().ok_or(ValidationError::EmptySheet)?;
    let columns = ColumnMap::resolve(&header)?;

    Ok(rows
        .map(|row| {
            let cell = |idx: usize| row.get(idx).cloned().unwrap_or_default();
            (cell(columns.word), cell(columns.group))
        })
        .collect())
}
