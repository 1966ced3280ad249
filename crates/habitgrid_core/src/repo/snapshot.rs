//! Point-in-time reads and full-state replacement.
//!
//! # Responsibility
//! - Load habits and completions together under one read transaction.
//! - Replace the whole registry and ledger atomically (import path).
//!
//! # Invariants
//! - A snapshot never mixes a habit list and a completion map read at
//!   different points in time.
//! - A failed replacement leaves prior state untouched.

use crate::model::completion::CompletionsByDate;
use crate::model::habit::Habit;
use crate::repo::completion_repo::{insert_completion, load_all_completions};
use crate::repo::habit_repo::{insert_habit, list_habits_in};
use crate::repo::{ensure_connection_ready, RepoResult};
use log::info;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Consistent view of registry and ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackerSnapshot {
    /// Habits in registry insertion order.
    pub habits: Vec<Habit>,
    pub completions: CompletionsByDate,
}

/// Counts written by `replace_snapshot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceSummary {
    pub habits: usize,
    pub completions: usize,
}

/// Reads habits and completions inside one deferred transaction.
pub fn load_snapshot(conn: &Connection) -> RepoResult<TrackerSnapshot> {
    ensure_connection_ready(conn)?;
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Deferred)?;
    let habits = list_habits_in(&tx)?;
    let completions = load_all_completions(&tx)?;
    tx.commit()?;
    Ok(TrackerSnapshot {
        habits,
        completions,
    })
}

/// Replaces all habits and completions in one immediate transaction.
///
/// Habits keep the order of `snapshot.habits`. Callers are expected to
/// have removed completion references to habits absent from the snapshot.
pub fn replace_snapshot(conn: &Connection, snapshot: &TrackerSnapshot) -> RepoResult<ReplaceSummary> {
    ensure_connection_ready(conn)?;
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    tx.execute("DELETE FROM completions;", [])?;
    tx.execute("DELETE FROM habits;", [])?;

    for habit in &snapshot.habits {
        insert_habit(&tx, habit)?;
    }

    let mut completions = 0usize;
    for (date, habit_ids) in &snapshot.completions {
        for habit_id in habit_ids {
            insert_completion(&tx, *date, habit_id)?;
            completions += 1;
        }
    }
    tx.commit()?;

    info!(
        "event=snapshot_replace module=repo status=ok habits={} completions={}",
        snapshot.habits.len(),
        completions
    );
    Ok(ReplaceSummary {
        habits: snapshot.habits.len(),
        completions,
    })
}
