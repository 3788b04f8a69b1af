//! Read-side aggregation for the stats and history views.
//!
//! Accuracies are percentages in `0.0..=100.0`.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{SessionResult, Word};

/// Days covered by the accuracy and volume trends.
pub const TREND_WINDOW_DAYS: i64 = 30;

/// Length of the problematic words list.
pub const PROBLEMATIC_LIMIT: usize = 20;

/// Number of sessions shown as recent activity.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Accuracy of one session, or `None` when it served no words.
pub fn session_accuracy(total_words: u32, correct_words: u32) -> Option<f64> {
    if total_words == 0 {
        return None;
    }
    Some(f64::from(correct_words) / f64::from(total_words) * 100.0)
}

/// Mean of per-session accuracies. Sessions that served no words are left
/// out of the denominator rather than counted as zero.
pub fn average_accuracy(sessions: &[SessionResult]) -> f64 {
    let accuracies: Vec<f64> = sessions
        .iter()
        .filter_map(|s| session_accuracy(s.total_words, s.correct_words))
        .collect();
    if accuracies.is_empty() {
        return 0.0;
    }
    accuracies.iter().sum::<f64>() / accuracies.len() as f64
}

/// One day of the history trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub accuracy: f64,
    pub words: u32,
}

/// Per-day accuracy and volume over the trailing window ending at `now`.
///
/// A day with several sessions merges accuracy pairwise in completion order:
/// `(previous + next) / 2`. Later sessions therefore weigh more than earlier
/// ones; this is not a count-weighted mean. Word counts are summed.
pub fn daily_trend(sessions: &[SessionResult], now: DateTime<Utc>) -> Vec<DailyPoint> {
    let cutoff = now - Duration::days(TREND_WINDOW_DAYS);

    let mut in_window: Vec<&SessionResult> =
        sessions.iter().filter(|s| s.ended_at >= cutoff).collect();
    in_window.sort_by_key(|s| s.ended_at);

    let mut days: BTreeMap<NaiveDate, DailyPoint> = BTreeMap::new();
    for session in in_window {
        let Some(accuracy) = session_accuracy(session.total_words, session.correct_words) else {
            continue;
        };
        let date = session.ended_at.date_naive();
        days.entry(date)
            .and_modify(|point| {
                point.accuracy = (point.accuracy + accuracy) / 2.0;
                point.words += session.total_words;
            })
            .or_insert(DailyPoint {
                date,
                accuracy,
                words: session.total_words,
            });
    }

    days.into_values().collect()
}

/// Share of correct answers implied by a word's counters.
pub fn word_accuracy(correct_count: u32, incorrect_count: u32) -> f64 {
    let total = correct_count + incorrect_count;
    if total == 0 {
        return 0.0;
    }
    f64::from(correct_count) / f64::from(total) * 100.0
}

fn problematic_order(a: &Word, b: &Word) -> Ordering {
    b.counters
        .incorrect_count
        .cmp(&a.counters.incorrect_count)
        .then_with(|| match (a.last_tested, b.last_tested) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.id.cmp(&b.id))
}

/// Words with outstanding misses, worst first, capped at [`PROBLEMATIC_LIMIT`].
pub fn problematic_words<I>(words: I) -> Vec<Word>
where
    I: IntoIterator<Item = Word>,
{
    let mut words: Vec<Word> = words
        .into_iter()
        .filter(|w| w.counters.needs_review())
        .collect();
    words.sort_by(problematic_order);
    words.truncate(PROBLEMATIC_LIMIT);
    words
}
