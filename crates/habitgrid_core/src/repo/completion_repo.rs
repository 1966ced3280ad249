//! Completion ledger contracts and SQLite implementation.
//!
//! # Responsibility
//! - Flip a single `(date, habit_id)` completion fact.
//! - Serve per-day and full-history reads.
//!
//! # Invariants
//! - The `(date, habit_id)` primary key is the uniqueness backstop; a
//!   violation is reported as `RepoError::Conflict`, never as a second row.
//! - Toggle runs read-check-then-write inside one `IMMEDIATE` transaction.
//! - Completions may only reference live habits.

use crate::model::completion::{CompletionDate, CompletionsByDate, ToggleOutcome};
use crate::model::habit::HabitId;
use crate::repo::habit_repo::habit_exists;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use log::debug;
use rusqlite::{params, Connection, ErrorCode, Transaction, TransactionBehavior};
use std::collections::BTreeSet;

/// Repository interface for the completion ledger.
pub trait CompletionRepository {
    /// Creates the fact when absent, removes it when present.
    fn toggle_completion(
        &self,
        habit_id: &HabitId,
        date: CompletionDate,
    ) -> RepoResult<ToggleOutcome>;
    fn is_completed(&self, habit_id: &HabitId, date: CompletionDate) -> RepoResult<bool>;
    fn completions_for_date(&self, date: CompletionDate) -> RepoResult<BTreeSet<HabitId>>;
    fn all_completions(&self) -> RepoResult<CompletionsByDate>;
}

/// SQLite-backed completion ledger.
pub struct SqliteCompletionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCompletionRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CompletionRepository for SqliteCompletionRepository<'_> {
    fn toggle_completion(
        &self,
        habit_id: &HabitId,
        date: CompletionDate,
    ) -> RepoResult<ToggleOutcome> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !habit_exists(&tx, habit_id)? {
            return Err(RepoError::NotFound(habit_id.clone()));
        }

        let date_key = date.key();
        let removed = tx.execute(
            "DELETE FROM completions WHERE date = ?1 AND habit_id = ?2;",
            params![date_key.as_str(), habit_id.as_str()],
        )?;

        let completed = if removed > 0 {
            false
        } else {
            tx.execute(
                "INSERT INTO completions (date, habit_id) VALUES (?1, ?2);",
                params![date_key.as_str(), habit_id.as_str()],
            )
            .map_err(|err| map_insert_error(err, date, habit_id))?;
            true
        };

        tx.commit()?;
        debug!(
            "event=completion_toggle module=repo status=ok habit_id={} date={} completed={}",
            habit_id, date_key, completed
        );
        Ok(ToggleOutcome { completed })
    }

    fn is_completed(&self, habit_id: &HabitId, date: CompletionDate) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM completions WHERE date = ?1 AND habit_id = ?2
            );",
            params![date.key(), habit_id.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn completions_for_date(&self, date: CompletionDate) -> RepoResult<BTreeSet<HabitId>> {
        let mut stmt = self
            .conn
            .prepare("SELECT habit_id FROM completions WHERE date = ?1;")?;
        let mut rows = stmt.query([date.key()])?;
        let mut ids = BTreeSet::new();
        while let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            ids.insert(parse_habit_id(value)?);
        }
        Ok(ids)
    }

    fn all_completions(&self) -> RepoResult<CompletionsByDate> {
        load_all_completions(self.conn)
    }
}

/// Removes every completion referencing `habit_id`.
///
/// Only the registry delete path calls this, inside its own transaction.
/// Zero matching rows is a no-op.
pub(crate) fn cascade_delete_for_habit(conn: &Connection, habit_id: &HabitId) -> RepoResult<usize> {
    let removed = conn.execute(
        "DELETE FROM completions WHERE habit_id = ?1;",
        [habit_id.as_str()],
    )?;
    Ok(removed)
}

pub(crate) fn load_all_completions(conn: &Connection) -> RepoResult<CompletionsByDate> {
    let mut stmt = conn.prepare("SELECT date, habit_id FROM completions;")?;
    let mut rows = stmt.query([])?;
    let mut by_date = CompletionsByDate::new();
    while let Some(row) = rows.next()? {
        let date_text: String = row.get(0)?;
        let date = CompletionDate::parse(&date_text).map_err(|_| {
            RepoError::InvalidData(format!("invalid date `{date_text}` in completions.date"))
        })?;
        let habit_id = parse_habit_id(row.get(1)?)?;
        by_date.entry(date).or_default().insert(habit_id);
    }
    Ok(by_date)
}

pub(crate) fn insert_completion(
    conn: &Connection,
    date: CompletionDate,
    habit_id: &HabitId,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO completions (date, habit_id) VALUES (?1, ?2);",
        params![date.key(), habit_id.as_str()],
    )
    .map_err(|err| map_insert_error(err, date, habit_id))?;
    Ok(())
}

fn map_insert_error(err: rusqlite::Error, date: CompletionDate, habit_id: &HabitId) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            RepoError::Conflict {
                date,
                habit_id: habit_id.clone(),
            }
        }
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.code == ErrorCode::ConstraintViolation
                && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            RepoError::NotFound(habit_id.clone())
        }
        _ => RepoError::from(err),
    }
}

fn parse_habit_id(value: String) -> RepoResult<HabitId> {
    HabitId::parse(value.as_str()).map_err(|_| {
        RepoError::InvalidData(format!("blank habit id `{value}` in completions.habit_id"))
    })
}
