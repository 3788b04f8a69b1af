//! Error types for vocab-core.

use thiserror::Error;

/// Result type alias using ValidationError.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Input rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one group must be selected")]
    NoGroups,

    #[error("word count must be positive, got {0}")]
    NonPositiveWordCount(i64),

    #[error("word count must be at most {max}, got {0}", max = i32::MAX)]
    WordCountTooLarge(i64),

    #[error("spreadsheet must contain columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("spreadsheet is empty")]
    EmptySheet,
}
