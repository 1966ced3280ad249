//! Completion facts and calendar date keys.
//!
//! # Responsibility
//! - Define the `YYYY-MM-DD` date key used by the ledger and aggregator.
//! - Define the toggle result returned to callers.
//!
//! # Invariants
//! - `CompletionDate` always renders as zero-padded `YYYY-MM-DD`.
//! - No timezone conversion happens here; callers pass local dates.

use crate::model::habit::HabitId;
use chrono::{Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

static DATE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date key regex"));

/// Full completion history keyed by date.
///
/// Consumers must not rely on iteration order over dates.
pub type CompletionsByDate = BTreeMap<CompletionDate, BTreeSet<HabitId>>;

/// Error for malformed date keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateKeyError {
    pub value: String,
}

impl Display for DateKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid date `{}`; expected YYYY-MM-DD", self.value)
    }
}

impl Error for DateKeyError {}

/// Calendar day without time or timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CompletionDate(NaiveDate);

impl CompletionDate {
    /// Parses a strict `YYYY-MM-DD` key.
    pub fn parse(value: &str) -> Result<Self, DateKeyError> {
        let invalid = || DateKeyError {
            value: value.to_string(),
        };
        if !DATE_KEY_RE.is_match(value) {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(value, DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| invalid())
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Returns the date `days` calendar days earlier, if representable.
    pub fn days_before(&self, days: u64) -> Option<Self> {
        self.0.checked_sub_days(Days::new(days)).map(Self)
    }

    /// Renders the storage/serialization key.
    pub fn key(&self) -> String {
        self.0.format(DATE_KEY_FORMAT).to_string()
    }
}

impl Display for CompletionDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for CompletionDate {
    type Err = DateKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

/// Result of one toggle call: the state after the flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub completed: bool,
}

/// How a caller-side optimistic prediction compares to the stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Prediction matched; keep the optimistic UI state.
    Confirmed,
    /// Prediction diverged; roll the UI back to `completed`.
    Rollback { completed: bool },
}

impl ToggleOutcome {
    /// Compares a predicted completion state against this outcome.
    pub fn reconcile(&self, predicted: bool) -> Reconciliation {
        if predicted == self.completed {
            Reconciliation::Confirmed
        } else {
            Reconciliation::Rollback {
                completed: self.completed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletionDate, Reconciliation, ToggleOutcome};

    #[test]
    fn parse_accepts_padded_calendar_dates() {
        let date = CompletionDate::parse("2024-01-10").unwrap();
        assert_eq!(date.key(), "2024-01-10");
        assert_eq!(date.to_string(), "2024-01-10");
    }

    #[test]
    fn parse_rejects_unpadded_or_impossible_dates() {
        assert!(CompletionDate::parse("2024-1-10").is_err());
        assert!(CompletionDate::parse("2024-02-30").is_err());
        assert!(CompletionDate::parse("2024-01-10T00:00:00Z").is_err());
        assert!(CompletionDate::parse("").is_err());
    }

    #[test]
    fn days_before_crosses_month_and_leap_day() {
        let date = CompletionDate::parse("2024-03-01").unwrap();
        assert_eq!(date.days_before(1).unwrap().key(), "2024-02-29");
        assert_eq!(date.days_before(0).unwrap(), date);
    }

    #[test]
    fn reconcile_flags_mismatched_prediction() {
        let outcome = ToggleOutcome { completed: false };
        assert_eq!(outcome.reconcile(false), Reconciliation::Confirmed);
        assert_eq!(
            outcome.reconcile(true),
            Reconciliation::Rollback { completed: false }
        );
    }
}
