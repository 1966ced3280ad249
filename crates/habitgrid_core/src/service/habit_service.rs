//! Habit registry use-case service.
//!
//! # Responsibility
//! - Provide add/edit/delete/list entry points for habit definitions.
//! - Seed the starter habit set for a fresh store.
//!
//! # Invariants
//! - Blank names are rejected before any storage call.
//! - Deleting an unknown (or already deleted) habit is `NotFound`, not a
//!   silent no-op.

use crate::model::habit::{Habit, HabitId, HabitPatch, HabitValidationError};
use crate::repo::habit_repo::HabitRepository;
use crate::repo::RepoError;
use crate::service::ErrorKind;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Starter habits inserted by `seed_default_habits`: `(name, icon, color)`.
pub const DEFAULT_HABITS: &[(&str, &str, &str)] = &[
    ("Drink Water", "droplet", "blue"),
    ("Exercise", "dumbbell", "green"),
    ("Read", "book-open", "purple"),
];

/// Errors from habit registry operations.
#[derive(Debug)]
pub enum HabitServiceError {
    Validation(HabitValidationError),
    NotFound(HabitId),
    Repo(RepoError),
}

impl HabitServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Repo(RepoError::Conflict { .. }) => ErrorKind::Conflict,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for HabitServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "habit not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for HabitServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<HabitValidationError> for HabitServiceError {
    fn from(value: HabitValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for HabitServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Habit registry facade over repository implementations.
pub struct HabitService<R: HabitRepository> {
    repo: R,
}

impl<R: HabitRepository> HabitService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a habit with a fresh id and appends it to the registry.
    pub fn add_habit(
        &self,
        name: &str,
        icon: Option<&str>,
        color: Option<&str>,
    ) -> Result<Habit, HabitServiceError> {
        let habit = Habit::new(name, icon, color)?;
        self.repo.create_habit(&habit)?;
        info!("event=habit_add module=service status=ok habit_id={}", habit.id);
        Ok(habit)
    }

    /// Applies a partial update; omitted fields keep their stored value.
    pub fn edit_habit(
        &self,
        id: &HabitId,
        patch: &HabitPatch,
    ) -> Result<Habit, HabitServiceError> {
        let mut habit = self
            .repo
            .get_habit(id)?
            .ok_or_else(|| HabitServiceError::NotFound(id.clone()))?;
        habit.apply_patch(patch)?;
        self.repo.update_habit(&habit)?;
        info!("event=habit_edit module=service status=ok habit_id={id}");
        Ok(habit)
    }

    /// Deletes a habit together with all of its completions.
    pub fn delete_habit(&self, id: &HabitId) -> Result<(), HabitServiceError> {
        match self.repo.delete_habit(id) {
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(
                    "event=habit_delete module=service status=error habit_id={} error={}",
                    id, err
                );
                Err(err.into())
            }
        }
    }

    pub fn get_habit(&self, id: &HabitId) -> Result<Option<Habit>, HabitServiceError> {
        Ok(self.repo.get_habit(id)?)
    }

    /// Lists habits in insertion order.
    pub fn list_habits(&self) -> Result<Vec<Habit>, HabitServiceError> {
        Ok(self.repo.list_habits()?)
    }

    /// Inserts `DEFAULT_HABITS` when the registry is empty.
    ///
    /// Returns the habits created; empty when the registry already had data.
    pub fn seed_default_habits(&self) -> Result<Vec<Habit>, HabitServiceError> {
        if self.repo.count_habits()? > 0 {
            return Ok(Vec::new());
        }

        let mut created = Vec::with_capacity(DEFAULT_HABITS.len());
        for &(name, icon, color) in DEFAULT_HABITS {
            created.push(self.add_habit(name, Some(icon), Some(color))?);
        }
        Ok(created)
    }
}
