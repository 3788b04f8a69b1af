//! Core vocabulary drill library shared by the backend service.
//!
//! Provides:
//! - Review counter rules (mastery and miss tracking)
//! - Quiz selection ordering and request validation
//! - Import row normalization and spreadsheet column resolution
//! - Read-side statistics and history aggregation
//! - Shared types (Word, ReviewCounters, LexicalEntry, etc.)

pub mod error;
pub mod import;
pub mod progress;
pub mod selection;
pub mod stats;
pub mod types;

pub use error::{Result, ValidationError};
pub use import::{pairs_from_grid, ColumnMap, ImportRow, ImportStats, IMPORT_BATCH_SIZE};
pub use progress::MASTERY_THRESHOLD;
pub use selection::{review_priority, select_for_quiz, QuizRequest};
pub use types::{LexicalEntry, ReviewCounters, SessionResult, Word};
