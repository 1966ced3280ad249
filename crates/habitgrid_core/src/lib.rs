//! Core domain logic for the habit tracker.
//! This crate is the single source of truth for registry, ledger and
//! contribution-graph invariants.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod transfer;

pub use aggregate::{
    compute_window, contribution_window, day_summary, group_into_weeks, habits_completed_on,
    CompletionBand, DayBucket, DaySummary, DEFAULT_WINDOW_DAYS,
};
pub use config::{ConfigError, TrackerConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::completion::{
    CompletionDate, CompletionsByDate, DateKeyError, Reconciliation, ToggleOutcome,
};
pub use model::habit::{Habit, HabitId, HabitPatch, HabitValidationError};
pub use repo::completion_repo::{CompletionRepository, SqliteCompletionRepository};
pub use repo::habit_repo::{HabitRepository, SqliteHabitRepository};
pub use repo::snapshot::{load_snapshot, replace_snapshot, ReplaceSummary, TrackerSnapshot};
pub use repo::{RepoError, RepoResult};
pub use service::completion_service::{CompletionService, CompletionServiceError};
pub use service::habit_service::{HabitService, HabitServiceError, DEFAULT_HABITS};
pub use service::ErrorKind;
pub use transfer::{
    export_document, export_json, import_json, parse_import, ExportDocument, ImportSummary,
    TransferError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
