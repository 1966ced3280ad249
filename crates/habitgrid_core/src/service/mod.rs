//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into registry and ledger use-cases.
//! - Classify failures into caller-facing error kinds.

pub mod completion_service;
pub mod habit_service;

/// Caller-facing failure category for every mutation entry point.
///
/// UI layers map each kind to a message; none of them is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Empty or malformed input.
    Validation,
    /// Target habit does not exist.
    NotFound,
    /// Storage-level `(date, habit_id)` uniqueness race.
    Conflict,
    /// Database or persisted-state failure.
    Storage,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Storage => "storage",
        }
    }
}
