//! Habit registry contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `habits` table.
//! - Own the delete cascade into the completion ledger.
//!
//! # Invariants
//! - Listing order is insertion order (`position ASC`), never name order.
//! - Deleting a habit removes its completions in the same transaction.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::model::habit::{Habit, HabitId};
use crate::repo::completion_repo::cascade_delete_for_habit;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const HABIT_SELECT_SQL: &str = "SELECT
    habit_id,
    name,
    icon,
    color
FROM habits";

/// Repository interface for the habit registry.
pub trait HabitRepository {
    /// Persists a new habit at the end of the insertion order.
    fn create_habit(&self, habit: &Habit) -> RepoResult<()>;
    /// Overwrites name/icon/color of an existing habit.
    fn update_habit(&self, habit: &Habit) -> RepoResult<()>;
    fn get_habit(&self, id: &HabitId) -> RepoResult<Option<Habit>>;
    /// Lists all habits in insertion order.
    fn list_habits(&self) -> RepoResult<Vec<Habit>>;
    fn count_habits(&self) -> RepoResult<u64>;
    /// Deletes one habit and cascades into its completions.
    ///
    /// Returns the number of completion rows removed.
    fn delete_habit(&self, id: &HabitId) -> RepoResult<usize>;
}

/// SQLite-backed habit registry.
pub struct SqliteHabitRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteHabitRepository<'conn> {
    /// Creates a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl HabitRepository for SqliteHabitRepository<'_> {
    fn create_habit(&self, habit: &Habit) -> RepoResult<()> {
        insert_habit(self.conn, habit)
    }

    fn update_habit(&self, habit: &Habit) -> RepoResult<()> {
        habit.validate()?;

        let changed = self.conn.execute(
            "UPDATE habits
             SET
                name = ?2,
                icon = ?3,
                color = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE habit_id = ?1;",
            params![
                habit.id.as_str(),
                habit.name.as_str(),
                habit.icon.as_deref(),
                habit.color.as_deref(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(habit.id.clone()));
        }

        Ok(())
    }

    fn get_habit(&self, id: &HabitId) -> RepoResult<Option<Habit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HABIT_SELECT_SQL} WHERE habit_id = ?1;"))?;
        let mut rows = stmt.query([id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_habit_row(row)?));
        }
        Ok(None)
    }

    fn list_habits(&self) -> RepoResult<Vec<Habit>> {
        list_habits_in(self.conn)
    }

    fn count_habits(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM habits;", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    fn delete_habit(&self, id: &HabitId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !habit_exists(&tx, id)? {
            return Err(RepoError::NotFound(id.clone()));
        }

        let removed_completions = cascade_delete_for_habit(&tx, id)?;
        tx.execute("DELETE FROM habits WHERE habit_id = ?1;", [id.as_str()])?;
        tx.commit()?;

        info!(
            "event=habit_delete module=repo status=ok habit_id={} removed_completions={}",
            id, removed_completions
        );
        Ok(removed_completions)
    }
}

/// Inserts one habit at the tail of the insertion order.
pub(crate) fn insert_habit(conn: &Connection, habit: &Habit) -> RepoResult<()> {
    habit.validate()?;

    conn.execute(
        "INSERT INTO habits (
            habit_id,
            name,
            icon,
            color,
            position
        ) VALUES (
            ?1, ?2, ?3, ?4,
            (SELECT COALESCE(MAX(position), 0) + 1 FROM habits)
        );",
        params![
            habit.id.as_str(),
            habit.name.as_str(),
            habit.icon.as_deref(),
            habit.color.as_deref(),
        ],
    )?;

    Ok(())
}

pub(crate) fn list_habits_in(conn: &Connection) -> RepoResult<Vec<Habit>> {
    let mut stmt = conn.prepare(&format!("{HABIT_SELECT_SQL} ORDER BY position ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut habits = Vec::new();
    while let Some(row) = rows.next()? {
        habits.push(parse_habit_row(row)?);
    }
    Ok(habits)
}

pub(crate) fn habit_exists(conn: &Connection, id: &HabitId) -> RepoResult<bool> {
    let found = conn
        .query_row(
            "SELECT 1 FROM habits WHERE habit_id = ?1;",
            [id.as_str()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}

fn parse_habit_row(row: &Row<'_>) -> RepoResult<Habit> {
    let id_text: String = row.get("habit_id")?;
    let id = HabitId::parse(id_text.as_str()).map_err(|_| {
        RepoError::InvalidData(format!("blank habit id `{id_text}` in habits.habit_id"))
    })?;

    let habit = Habit {
        id,
        name: row.get("name")?,
        icon: row.get("icon")?,
        color: row.get("color")?,
    };
    habit
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("habit {}: {err}", habit.id)))?;
    Ok(habit)
}
