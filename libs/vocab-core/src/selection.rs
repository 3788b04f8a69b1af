//! Quiz selection.
//!
//! Words with the most outstanding misses come first; among equals the most
//! recently missed word wins, and words that were never missed sort last.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::error::{Result, ValidationError};
use crate::types::Word;

/// A validated request for a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    groups: BTreeSet<String>,
    word_count: i32,
}

impl QuizRequest {
    /// Validate raw request fields. Blank group names are ignored.
    pub fn new<I, S>(groups: I, word_count: i64) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if word_count <= 0 {
            return Err(ValidationError::NonPositiveWordCount(word_count));
        }
        let word_count = i32::try_from(word_count)
            .map_err(|_| ValidationError::WordCountTooLarge(word_count))?;

        let groups: BTreeSet<String> = groups
            .into_iter()
            .map(|g| g.as_ref().trim().to_string())
            .filter(|g| !g.is_empty())
            .collect();
        if groups.is_empty() {
            return Err(ValidationError::NoGroups);
        }

        Ok(Self { groups, word_count })
    }

    pub fn groups(&self) -> Vec<String> {
        self.groups.iter().cloned().collect()
    }

    pub fn word_count(&self) -> usize {
        self.word_count as usize
    }

    /// Word count as requested, in the store's integer width.
    pub fn requested_count(&self) -> i32 {
        self.word_count
    }

    pub fn includes(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}

/// Review order: incorrect_count desc, then last_incorrect desc with nulls
/// last. Ties fall back to id so the order is stable.
pub fn review_priority(a: &Word, b: &Word) -> Ordering {
    b.counters
        .incorrect_count
        .cmp(&a.counters.incorrect_count)
        .then_with(|| {
            match (a.counters.last_incorrect, b.counters.last_incorrect) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Pick up to `word_count` words from the requested groups in review order.
/// Returns fewer words when not enough match; never pads.
pub fn select_for_quiz<I>(words: I, request: &QuizRequest) -> Vec<Word>
where
    I: IntoIterator<Item = Word>,
{
    let mut candidates: Vec<Word> = words
        .into_iter()
        .filter(|w| request.includes(&w.group))
        .collect();
    candidates.sort_by(review_priority);
    candidates.truncate(request.word_count());
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ReviewCounters;
    use chrono::{DateTime, Duration, Utc};
    use pretty_assertions::assert_eq;

    fn word(id: i64, group: &str, incorrect: u32, missed_at: Option<DateTime<Utc>>) -> Word {
        Word {
            id,
            text: format!("word{id}"),
            group: group.to_string(),
            definition: None,
            synonyms: vec![],
            counters: ReviewCounters {
                correct_count: 0,
                incorrect_count: incorrect,
                last_incorrect: missed_at,
            },
            last_tested: None,
            flagged: false,
        }
    }

    fn ids(words: &[Word]) -> Vec<i64> {
        words.iter().map(|w| w.id).collect()
    }

    #[test]
    fn rejects_empty_groups() {
        assert_eq!(
            QuizRequest::new(Vec::<String>::new(), 5),
            Err(ValidationError::NoGroups)
        );
        assert_eq!(QuizRequest::new(["  "], 5), Err(ValidationError::NoGroups));
    }

    #[test]
    fn rejects_non_positive_count() {
        assert_eq!(
            QuizRequest::new(["A"], 0),
            Err(ValidationError::NonPositiveWordCount(0))
        );
        assert_eq!(
            QuizRequest::new(["A"], -3),
            Err(ValidationError::NonPositiveWordCount(-3))
        );
    }

    #[test]
    fn rejects_count_beyond_store_range() {
        assert_eq!(
            QuizRequest::new(["A"], 3_000_000_000),
            Err(ValidationError::WordCountTooLarge(3_000_000_000))
        );
        let largest = QuizRequest::new(["A"], i64::from(i32::MAX)).unwrap();
        assert_eq!(largest.requested_count(), i32::MAX);
    }

    #[test]
    fn orders_by_misses_then_recency() {
        let now = Utc::now();
        let words = vec![
            word(1, "A", 0, None),
            word(2, "A", 2, Some(now - Duration::days(3))),
            word(3, "A", 2, Some(now - Duration::days(1))),
            word(4, "A", 5, Some(now - Duration::days(10))),
            word(5, "A", 1, None),
        ];
        let request = QuizRequest::new(["A"], 10).unwrap();
        let selected = select_for_quiz(words, &request);
        assert_eq!(ids(&selected), vec![4, 3, 2, 5, 1]);
    }

    #[test]
    fn missing_recency_sorts_last_within_equal_misses() {
        let now = Utc::now();
        let words = vec![word(1, "A", 1, None), word(2, "A", 1, Some(now))];
        let request = QuizRequest::new(["A"], 2).unwrap();
        assert_eq!(ids(&select_for_quiz(words, &request)), vec![2, 1]);
    }

    #[test]
    fn truncates_and_filters_groups() {
        let words = vec![
            word(1, "A", 3, None),
            word(2, "B", 9, None),
            word(3, "A", 1, None),
            word(4, "C", 2, None),
            word(5, "A", 0, None),
        ];
        let request = QuizRequest::new(["A", "C"], 3).unwrap();
        let selected = select_for_quiz(words, &request);
        assert_eq!(ids(&selected), vec![1, 4, 3]);
        assert!(selected.iter().all(|w| w.group != "B"));
    }

    #[test]
    fn never_pads_short_selection() {
        let words = vec![word(1, "A", 0, None)];
        let request = QuizRequest::new(["A"], 10).unwrap();
        assert_eq!(select_for_quiz(words, &request).len(), 1);
    }

    #[test]
    fn empty_when_no_group_matches() {
        let words = vec![word(1, "A", 0, None)];
        let request = QuizRequest::new(["Z"], 10).unwrap();
        assert!(select_for_quiz(words, &request).is_empty());
    }

    #[test]
    fn selection_is_non_increasing_in_misses() {
        let now = Utc::now();
        let words: Vec<Word> = (0..40)
            .map(|i| {
                let misses = (i * 7 % 5) as u32;
                let missed = (misses > 0).then(|| now - Duration::hours(i));
                word(i, if i % 2 == 0 { "A" } else { "B" }, misses, missed)
            })
            .collect();
        let request = QuizRequest::new(["A", "B"], 25).unwrap();
        let selected = select_for_quiz(words, &request);
        assert_eq!(selected.len(), 25);
        for pair in selected.windows(2) {
            assert!(pair[0].counters.incorrect_count >= pair[1].counters.incorrect_count);
        }
    }
}
