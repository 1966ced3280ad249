//! Habit domain model.
//!
//! # Responsibility
//! - Define the habit record owned by the registry.
//! - Normalize user input (trimmed names, blank style fields as absent).
//!
//! # Invariants
//! - `id` is assigned once at creation and never changes.
//! - `name` is non-empty after trimming.
//! - `icon` and `color` are opaque catalog keys; core stores them verbatim.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque, stable habit identifier.
///
/// Generated ids are UUID v4 strings, but imported data may carry any
/// non-blank token, so the type does not assume a UUID shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    /// Generates a fresh process-unique identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an externally supplied identifier.
    ///
    /// # Errors
    /// - Returns `HabitValidationError::EmptyId` for blank input.
    pub fn parse(value: impl Into<String>) -> Result<Self, HabitValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(HabitValidationError::EmptyId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for HabitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation errors for habit records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HabitValidationError {
    /// Name is empty after trimming.
    EmptyName,
    /// Identifier is empty after trimming.
    EmptyId,
}

impl Display for HabitValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "habit name must not be blank"),
            Self::EmptyId => write!(f, "habit id must not be blank"),
        }
    }
}

impl Error for HabitValidationError {}

/// A user-defined recurring task tracked per calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl Habit {
    /// Creates a habit with a freshly generated id.
    ///
    /// # Errors
    /// - Returns `HabitValidationError::EmptyName` when `name` is blank.
    pub fn new(
        name: &str,
        icon: Option<&str>,
        color: Option<&str>,
    ) -> Result<Self, HabitValidationError> {
        Self::with_id(HabitId::generate(), name, icon, color)
    }

    /// Creates a habit with a caller-provided id.
    ///
    /// Used by import paths where identity already exists externally.
    pub fn with_id(
        id: HabitId,
        name: &str,
        icon: Option<&str>,
        color: Option<&str>,
    ) -> Result<Self, HabitValidationError> {
        let habit = Self {
            id,
            name: normalize_name(name)?,
            icon: normalize_style(icon),
            color: normalize_style(color),
        };
        habit.validate()?;
        Ok(habit)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), HabitValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(HabitValidationError::EmptyId);
        }
        if self.name.trim().is_empty() {
            return Err(HabitValidationError::EmptyName);
        }
        Ok(())
    }

    /// Applies a partial update in place.
    ///
    /// The habit is left untouched when the resulting name would be blank.
    pub fn apply_patch(&mut self, patch: &HabitPatch) -> Result<(), HabitValidationError> {
        let name = match patch.name.as_deref() {
            Some(value) => normalize_name(value)?,
            None => self.name.clone(),
        };

        self.name = name;
        if let Some(icon) = patch.icon.as_deref() {
            self.icon = normalize_style(Some(icon));
        }
        if let Some(color) = patch.color.as_deref() {
            self.color = normalize_style(Some(color));
        }
        Ok(())
    }
}

/// Partial update for an existing habit.
///
/// `None` leaves a field unchanged. For `icon` and `color`, `Some("")`
/// clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl HabitPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.icon.is_none() && self.color.is_none()
    }
}

/// Trims a display name and rejects blank values.
pub fn normalize_name(name: &str) -> Result<String, HabitValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(HabitValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Maps blank style keys to `None`, keeping non-blank keys verbatim.
pub fn normalize_style(value: Option<&str>) -> Option<String> {
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::{normalize_style, Habit, HabitId, HabitPatch, HabitValidationError};

    #[test]
    fn new_habit_trims_name_and_generates_id() {
        let habit = Habit::new("  Drink Water ", Some("droplet"), Some("blue")).unwrap();
        assert_eq!(habit.name, "Drink Water");
        assert!(!habit.id.as_str().is_empty());
        assert_eq!(habit.icon.as_deref(), Some("droplet"));
    }

    #[test]
    fn new_habit_rejects_blank_name() {
        let err = Habit::new("   ", None, None).unwrap_err();
        assert_eq!(err, HabitValidationError::EmptyName);
    }

    #[test]
    fn generated_ids_do_not_collide() {
        assert_ne!(HabitId::generate(), HabitId::generate());
    }

    #[test]
    fn blank_style_values_become_absent() {
        assert_eq!(normalize_style(Some("")), None);
        assert_eq!(normalize_style(Some("  ")), None);
        assert_eq!(normalize_style(Some("sun")), Some("sun".to_string()));
    }

    #[test]
    fn patch_leaves_omitted_fields_unchanged() {
        let mut habit = Habit::new("Read", Some("book-open"), Some("purple")).unwrap();
        habit
            .apply_patch(&HabitPatch {
                name: Some("Read more".to_string()),
                ..HabitPatch::default()
            })
            .unwrap();
        assert_eq!(habit.name, "Read more");
        assert_eq!(habit.icon.as_deref(), Some("book-open"));
        assert_eq!(habit.color.as_deref(), Some("purple"));
    }

    #[test]
    fn patch_with_blank_name_keeps_original_state() {
        let mut habit = Habit::new("Read", None, None).unwrap();
        let err = habit
            .apply_patch(&HabitPatch {
                name: Some(" ".to_string()),
                color: Some("green".to_string()),
                ..HabitPatch::default()
            })
            .unwrap_err();
        assert_eq!(err, HabitValidationError::EmptyName);
        assert_eq!(habit.name, "Read");
        assert_eq!(habit.color, None);
    }

    #[test]
    fn patch_with_empty_style_clears_value() {
        let mut habit = Habit::new("Read", Some("book-open"), None).unwrap();
        habit
            .apply_patch(&HabitPatch {
                icon: Some(String::new()),
                ..HabitPatch::default()
            })
            .unwrap();
        assert_eq!(habit.icon, None);
    }
}
