//! Streak math over habit completion day keys.
//!
//! Everything here is pure: streaks are always recomputed from the full
//! set of completed days rather than adjusted incrementally, because
//! removing an interior day can shorten a run in ways an incremental
//! counter would miss.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Derived streak values for one habit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StreakSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_completed_days: u32,
}

/// Consecutive completed days ending at `today`, walking backward until
/// the first missing day. A habit not completed today (nor yesterday,
/// etc.) yields 0.
pub fn current_streak(days: &[NaiveDate], today: NaiveDate) -> u32 {
    let set: BTreeSet<NaiveDate> = days.iter().copied().collect();
    let mut day = today;
    let mut run = 0u32;
    while set.contains(&day) {
        run += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    run
}

/// Best consecutive run anywhere in history. Single ascending scan; a gap
/// of more than one day resets the run.
pub fn longest_streak(days: &[NaiveDate]) -> u32 {
    // BTreeSet gives ascending order and de-duplicates defensively; the
    // caller is supposed to hold set semantics but we do not rely on it.
    let set: BTreeSet<NaiveDate> = days.iter().copied().collect();

    let mut best = 0u32;
    let mut run = 0u32;
    let mut prev: Option<NaiveDate> = None;
    for day in set {
        run = match prev {
            Some(p) if (day - p).num_days() == 1 => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(day);
    }
    best
}

/// Full recompute of every derived streak field. Called after each
/// completion-marker mutation.
pub fn recompute(days: &[NaiveDate], today: NaiveDate) -> StreakSummary {
    let unique: BTreeSet<NaiveDate> = days.iter().copied().collect();
    StreakSummary {
        current_streak: current_streak(days, today),
        longest_streak: longest_streak(days),
        total_completed_days: unique.len() as u32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 15).unwrap()
    }

    fn days_back(offsets: &[i64]) -> Vec<NaiveDate> {
        offsets
            .iter()
            .map(|off| today() - Duration::days(*off))
            .collect()
    }

    #[test]
    fn empty_set_yields_zero_everywhere() {
        assert_eq!(current_streak(&[], today()), 0);
        assert_eq!(longest_streak(&[]), 0);
        let s = recompute(&[], today());
        assert_eq!(s.total_completed_days, 0);
    }

    #[test]
    fn three_consecutive_days_ending_today() {
        let days = days_back(&[0, 1, 2]);
        assert_eq!(current_streak(&days, today()), 3);
        assert_eq!(longest_streak(&days), 3);
    }

    #[test]
    fn gap_splits_current_from_history() {
        // {today-5, today-4, today-1, today}
        let days = days_back(&[5, 4, 1, 0]);
        assert_eq!(current_streak(&days, today()), 2);
        assert_eq!(longest_streak(&days), 2);
    }

    #[test]
    fn missing_today_and_yesterday_means_no_current_streak() {
        let days = days_back(&[3, 4, 5]);
        assert_eq!(current_streak(&days, today()), 0);
        assert_eq!(longest_streak(&days), 3);
    }

    #[test]
    fn removing_an_interior_day_drops_current_streak() {
        let full = days_back(&[0, 1, 2]);
        assert_eq!(current_streak(&full, today()), 3);

        // Un-completing today-1 must recompute to 1, not decrement to 2.
        let without_middle = days_back(&[0, 2]);
        assert_eq!(current_streak(&without_middle, today()), 1);
    }

    #[test]
    fn duplicate_day_keys_are_not_double_counted() {
        let days = days_back(&[0, 0, 1, 1, 2]);
        let s = recompute(&days, today());
        assert_eq!(s.current_streak, 3);
        assert_eq!(s.longest_streak, 3);
        assert_eq!(s.total_completed_days, 3);
    }

    #[test]
    fn longest_streak_spans_month_boundary() {
        let days = vec![
            NaiveDate::from_ymd_opt(2025, 2, 27).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 2).unwrap(),
        ];
        assert_eq!(longest_streak(&days), 4);
    }
}
