//! Answer recording rule.
//!
//! A correct answer advances the streak; the third one in a row masters the
//! word and clears its miss history. Any incorrect answer breaks the streak
//! and stamps the miss.

use chrono::{DateTime, Utc};

use crate::types::ReviewCounters;

/// Consecutive correct answers needed to clear a word's misses.
pub const MASTERY_THRESHOLD: u32 = 3;

impl ReviewCounters {
    /// Apply one answer.
    pub fn record(&mut self, correct: bool, now: DateTime<Utc>) {
        if correct {
            self.correct_count = self.correct_count.saturating_add(1);
            if self.correct_count >= MASTERY_THRESHOLD {
                self.incorrect_count = 0;
                self.last_incorrect = None;
            }
        } else {
            self.incorrect_count = self.incorrect_count.saturating_add(1);
            self.last_incorrect = Some(now);
            self.correct_count = 0;
        }
    }

    pub fn is_mastered(&self) -> bool {
        self.correct_count >= MASTERY_THRESHOLD
    }

    /// Words with outstanding misses are due for review.
    pub fn needs_review(&self) -> bool {
        self.incorrect_count > 0
    }
}
