//! Completion ledger use-case service.
//!
//! # Responsibility
//! - Expose toggle and history reads to callers.
//! - Absorb storage uniqueness races so they never reach the user.
//!
//! # Invariants
//! - `toggle_completion` is an involution for a fixed `(habit, date)`.
//! - A `Conflict` from storage is resolved by returning the stored state.

use crate::model::completion::{CompletionDate, CompletionsByDate, ToggleOutcome};
use crate::model::habit::HabitId;
use crate::repo::completion_repo::CompletionRepository;
use crate::repo::RepoError;
use crate::service::ErrorKind;
use log::warn;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from completion ledger operations.
#[derive(Debug)]
pub enum CompletionServiceError {
    HabitNotFound(HabitId),
    Repo(RepoError),
}

impl CompletionServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HabitNotFound(_) => ErrorKind::NotFound,
            Self::Repo(RepoError::Conflict { .. }) => ErrorKind::Conflict,
            Self::Repo(RepoError::Validation(_)) => ErrorKind::Validation,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for CompletionServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HabitNotFound(id) => write!(f, "habit not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CompletionServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::HabitNotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for CompletionServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::HabitNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Completion ledger facade over repository implementations.
pub struct CompletionService<R: CompletionRepository> {
    repo: R,
}

impl<R: CompletionRepository> CompletionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Flips the completion state of `habit_id` on `date`.
    ///
    /// Callers wanting an idempotent "mark complete" must check
    /// `is_completed` first.
    pub fn toggle_completion(
        &self,
        habit_id: &HabitId,
        date: CompletionDate,
    ) -> Result<ToggleOutcome, CompletionServiceError> {
        match self.repo.toggle_completion(habit_id, date) {
            Ok(outcome) => Ok(outcome),
            Err(RepoError::Conflict { .. }) => {
                // A concurrent writer created the row first; report what is stored.
                warn!(
                    "event=completion_toggle module=service status=conflict habit_id={} date={}",
                    habit_id, date
                );
                let completed = self.repo.is_completed(habit_id, date)?;
                Ok(ToggleOutcome { completed })
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn is_completed(
        &self,
        habit_id: &HabitId,
        date: CompletionDate,
    ) -> Result<bool, CompletionServiceError> {
        Ok(self.repo.is_completed(habit_id, date)?)
    }

    /// Returns the habits completed on `date`; empty when none.
    pub fn completions_for_date(
        &self,
        date: CompletionDate,
    ) -> Result<BTreeSet<HabitId>, CompletionServiceError> {
        Ok(self.repo.completions_for_date(date)?)
    }

    /// Returns the full completion history.
    pub fn all_completions(&self) -> Result<CompletionsByDate, CompletionServiceError> {
        Ok(self.repo.all_completions()?)
    }
}
