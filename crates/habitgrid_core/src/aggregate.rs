//! Contribution-graph projection over registry and ledger snapshots.
//!
//! # Responsibility
//! - Derive per-day completion ratios for a trailing window.
//! - Map ratios onto the fixed six-step intensity bands.
//!
//! # Invariants
//! - Pure functions; nothing here reads storage or keeps state.
//! - Every calendar day of the window yields exactly one bucket, in
//!   chronological order.
//! - `percentage` is `0` whenever there are no habits.

use crate::model::completion::{CompletionDate, CompletionsByDate};
use crate::model::habit::{Habit, HabitId};
use crate::repo::snapshot::TrackerSnapshot;
use std::collections::BTreeSet;

/// Sixteen full weeks.
pub const DEFAULT_WINDOW_DAYS: u32 = 112;
pub const DAYS_PER_WEEK: usize = 7;

/// Derived completion ratio for one calendar day. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct DayBucket {
    pub date: CompletionDate,
    pub completed_habit_ids: BTreeSet<HabitId>,
    pub completed_count: usize,
    pub total_habits: usize,
    /// In `[0, 100]` for consistent snapshots.
    pub percentage: f64,
}

impl DayBucket {
    pub fn band(&self) -> CompletionBand {
        CompletionBand::from_percentage(self.percentage)
    }
}

/// Visual intensity step for a day's completion percentage.
///
/// Breakpoints are half-open (`[25, 50)` etc.); exactly `100` is its own
/// band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CompletionBand {
    /// `0`
    Empty,
    /// `(0, 25)`
    Low,
    /// `[25, 50)`
    Medium,
    /// `[50, 75)`
    High,
    /// `[75, 100)`
    VeryHigh,
    /// `100`
    Full,
}

impl CompletionBand {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage.is_nan() || percentage <= 0.0 {
            Self::Empty
        } else if percentage < 25.0 {
            Self::Low
        } else if percentage < 50.0 {
            Self::Medium
        } else if percentage < 75.0 {
            Self::High
        } else if percentage < 100.0 {
            Self::VeryHigh
        } else {
            Self::Full
        }
    }

    /// Numeric level `0..=5` used by renderers.
    pub fn level(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::VeryHigh => 4,
            Self::Full => 5,
        }
    }
}

/// "n of m done" summary for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaySummary {
    pub date: CompletionDate,
    pub completed: usize,
    pub total: usize,
}

/// Computes one bucket per day for the `window_days` days ending at `today`.
///
/// Returns an empty sequence for `window_days == 0`.
pub fn compute_window(
    today: CompletionDate,
    window_days: u32,
    habits: &[Habit],
    completions: &CompletionsByDate,
) -> Vec<DayBucket> {
    let total_habits = habits.len();
    (0..u64::from(window_days))
        .rev()
        .filter_map(|offset| today.days_before(offset))
        .map(|date| {
            let completed_habit_ids = completions.get(&date).cloned().unwrap_or_default();
            let completed_count = completed_habit_ids.len();
            DayBucket {
                date,
                completed_habit_ids,
                completed_count,
                total_habits,
                percentage: completion_percentage(completed_count, total_habits),
            }
        })
        .collect()
}

/// Same as `compute_window`, reading both inputs from one snapshot.
pub fn contribution_window(
    snapshot: &TrackerSnapshot,
    today: CompletionDate,
    window_days: u32,
) -> Vec<DayBucket> {
    compute_window(today, window_days, &snapshot.habits, &snapshot.completions)
}

/// Splits chronological days into runs of seven.
///
/// A trailing run shorter than a week is kept short rather than padded.
pub fn group_into_weeks<T>(days: &[T]) -> Vec<&[T]> {
    days.chunks(DAYS_PER_WEEK).collect()
}

/// Filters `habits` to those completed on `date`, keeping registry order.
pub fn habits_completed_on<'a>(
    date: CompletionDate,
    habits: &'a [Habit],
    completions: &CompletionsByDate,
) -> Vec<&'a Habit> {
    match completions.get(&date) {
        Some(ids) => habits.iter().filter(|habit| ids.contains(&habit.id)).collect(),
        None => Vec::new(),
    }
}

pub fn day_summary(
    date: CompletionDate,
    habits: &[Habit],
    completions: &CompletionsByDate,
) -> DaySummary {
    DaySummary {
        date,
        completed: habits_completed_on(date, habits, completions).len(),
        total: habits.len(),
    }
}

fn completion_percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    100.0 * completed as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::{
        compute_window, day_summary, group_into_weeks, habits_completed_on, CompletionBand,
        DEFAULT_WINDOW_DAYS,
    };
    use crate::model::completion::{CompletionDate, CompletionsByDate};
    use crate::model::habit::{Habit, HabitId};
    use std::collections::BTreeSet;

    fn date(value: &str) -> CompletionDate {
        CompletionDate::parse(value).unwrap()
    }

    fn habit(id: &str, name: &str) -> Habit {
        Habit::with_id(HabitId::parse(id).unwrap(), name, None, None).unwrap()
    }

    fn completed_on(day: &str, ids: &[&str]) -> CompletionsByDate {
        let set: BTreeSet<HabitId> = ids.iter().map(|id| HabitId::parse(*id).unwrap()).collect();
        let mut data = CompletionsByDate::new();
        data.insert(date(day), set);
        data
    }

    #[test]
    fn band_breakpoints_are_half_open_with_exact_full() {
        let cases = [
            (0.0, 0),
            (24.9, 1),
            (25.0, 2),
            (49.9, 2),
            (50.0, 3),
            (74.9, 3),
            (75.0, 4),
            (99.9, 4),
            (100.0, 5),
        ];
        for (percentage, level) in cases {
            assert_eq!(
                CompletionBand::from_percentage(percentage).level(),
                level,
                "percentage {percentage}"
            );
        }
    }

    #[test]
    fn tiny_positive_percentage_is_low_band() {
        assert_eq!(CompletionBand::from_percentage(0.01), CompletionBand::Low);
    }

    #[test]
    fn window_is_chronological_and_ends_today() {
        let buckets = compute_window(date("2024-01-10"), 5, &[], &CompletionsByDate::new());
        let keys: Vec<String> = buckets.iter().map(|bucket| bucket.date.key()).collect();
        assert_eq!(
            keys,
            vec![
                "2024-01-06",
                "2024-01-07",
                "2024-01-08",
                "2024-01-09",
                "2024-01-10"
            ]
        );
    }

    #[test]
    fn default_window_covers_sixteen_weeks() {
        let buckets = compute_window(
            date("2024-04-21"),
            DEFAULT_WINDOW_DAYS,
            &[],
            &CompletionsByDate::new(),
        );
        assert_eq!(buckets.len(), 112);
        assert_eq!(buckets[0].date.key(), "2024-01-01");
        assert_eq!(group_into_weeks(&buckets).len(), 16);
    }

    #[test]
    fn empty_habit_list_yields_zero_percentages() {
        let data = completed_on("2024-01-10", &["ghost"]);
        let buckets = compute_window(date("2024-01-10"), 3, &[], &data);
        assert!(buckets
            .iter()
            .all(|bucket| bucket.percentage == 0.0 && bucket.band() == CompletionBand::Empty));
    }

    #[test]
    fn half_completed_day_lands_in_band_three() {
        let habits = vec![habit("h1", "Water"), habit("h2", "Read")];
        let data = completed_on("2024-01-10", &["h1"]);
        let buckets = compute_window(date("2024-01-10"), 1, &habits, &data);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].percentage, 50.0);
        assert_eq!(buckets[0].completed_count, 1);
        assert_eq!(buckets[0].total_habits, 2);
        assert_eq!(buckets[0].band().level(), 3);
    }

    #[test]
    fn partial_week_is_kept_short() {
        let buckets = compute_window(date("2024-01-10"), 10, &[], &CompletionsByDate::new());
        let weeks = group_into_weeks(&buckets);
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].len(), 7);
        assert_eq!(weeks[1].len(), 3);
        assert_eq!(weeks[1][2].date.key(), "2024-01-10");
    }

    #[test]
    fn zero_length_window_is_empty() {
        assert!(compute_window(date("2024-01-10"), 0, &[], &CompletionsByDate::new()).is_empty());
    }

    #[test]
    fn habits_completed_on_preserves_registry_order() {
        let habits = vec![habit("b", "Second"), habit("a", "First"), habit("c", "Third")];
        let data = completed_on("2024-01-10", &["a", "b"]);
        let names: Vec<&str> = habits_completed_on(date("2024-01-10"), &habits, &data)
            .into_iter()
            .map(|habit| habit.name.as_str())
            .collect();
        assert_eq!(names, vec!["Second", "First"]);

        assert!(habits_completed_on(date("2024-01-11"), &habits, &data).is_empty());
    }

    #[test]
    fn day_summary_counts_completed_and_total() {
        let habits = vec![habit("h1", "Water"), habit("h2", "Read"), habit("h3", "Run")];
        let data = completed_on("2024-01-10", &["h1", "h3"]);
        let summary = day_summary(date("2024-01-10"), &habits, &data);
        assert_eq!(summary.completed, 2);
        assert_eq!(summary.total, 3);
    }
}
