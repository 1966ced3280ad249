//! JSON export/import of the full tracker state.
//!
//! # Responsibility
//! - Serialize registry and ledger into the portable export document.
//! - Validate an import payload and replace all state in one transaction.
//!
//! # Invariants
//! - Import is all-or-nothing: a rejected payload leaves state untouched.
//! - Import replaces, never merges.
//! - Completion references to habits absent from the payload are dropped,
//!   so no orphan completion is ever written.

use crate::model::completion::{CompletionDate, CompletionsByDate};
use crate::model::habit::{Habit, HabitId};
use crate::repo::snapshot::{load_snapshot, replace_snapshot, TrackerSnapshot};
use crate::repo::RepoError;
use crate::service::ErrorKind;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Portable export document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub habits: Vec<Habit>,
    /// `YYYY-MM-DD` -> habit ids, in registry order.
    pub completion_data: BTreeMap<String, Vec<String>>,
    /// Informational only; not validated on import.
    pub export_date: String,
}

/// Counts reported after a successful import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub habits: usize,
    pub completions: usize,
    /// Completion entries skipped because their habit is not in the payload.
    pub dropped_references: usize,
}

/// Errors from export/import.
#[derive(Debug)]
pub enum TransferError {
    /// Payload is not parseable JSON.
    InvalidJson(serde_json::Error),
    /// Payload is JSON but violates the document structure.
    InvalidPayload(String),
    Repo(RepoError),
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidJson(_) | Self::InvalidPayload(_) => ErrorKind::Validation,
            Self::Repo(_) => ErrorKind::Storage,
        }
    }
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(err) => write!(f, "invalid JSON format: {err}"),
            Self::InvalidPayload(message) => write!(f, "invalid data format: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(err) => Some(err),
            Self::InvalidPayload(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for TransferError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidJson(value)
    }
}

/// Builds the export document for a snapshot.
pub fn export_document(snapshot: &TrackerSnapshot, exported_at: DateTime<Utc>) -> ExportDocument {
    let mut completion_data = BTreeMap::new();
    for (date, ids) in &snapshot.completions {
        let ordered: Vec<String> = snapshot
            .habits
            .iter()
            .filter(|habit| ids.contains(&habit.id))
            .map(|habit| habit.id.to_string())
            .collect();
        if !ordered.is_empty() {
            completion_data.insert(date.key(), ordered);
        }
    }

    ExportDocument {
        habits: snapshot.habits.clone(),
        completion_data,
        export_date: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Reads a consistent snapshot and renders it as pretty JSON.
pub fn export_json(conn: &Connection) -> Result<String, TransferError> {
    let snapshot = load_snapshot(conn)?;
    let document = export_document(&snapshot, Utc::now());
    let rendered = serde_json::to_string_pretty(&document)?;
    info!(
        "event=data_export module=transfer status=ok habits={} dates={}",
        document.habits.len(),
        document.completion_data.len()
    );
    Ok(rendered)
}

/// Validates `raw` and fully replaces the stored registry and ledger.
pub fn import_json(conn: &Connection, raw: &str) -> Result<ImportSummary, TransferError> {
    let (snapshot, dropped_references) = match parse_import(raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(
                "event=data_import module=transfer status=rejected error_kind={}",
                err.kind().as_str()
            );
            return Err(err);
        }
    };

    let written = replace_snapshot(conn, &snapshot)?;
    if dropped_references > 0 {
        warn!(
            "event=data_import module=transfer status=partial dropped_references={}",
            dropped_references
        );
    }
    info!(
        "event=data_import module=transfer status=ok habits={} completions={}",
        written.habits, written.completions
    );
    Ok(ImportSummary {
        habits: written.habits,
        completions: written.completions,
        dropped_references,
    })
}

/// Parses and validates an import payload without touching storage.
///
/// Returns the snapshot to write and the number of dropped completion
/// references.
pub fn parse_import(raw: &str) -> Result<(TrackerSnapshot, usize), TransferError> {
    let value: Value = serde_json::from_str(raw)?;
    let root = value
        .as_object()
        .ok_or_else(|| invalid("payload must be a JSON object"))?;

    let habit_entries = root
        .get("habits")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid("habits array is missing"))?;
    let completion_entries = root
        .get("completionData")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("completionData object is missing"))?;

    let habits = parse_habits(habit_entries)?;
    let (completions, dropped) = parse_completions(completion_entries, &habits)?;
    Ok((
        TrackerSnapshot {
            habits,
            completions,
        },
        dropped,
    ))
}

fn parse_habits(entries: &[Value]) -> Result<Vec<Habit>, TransferError> {
    let mut seen = HashSet::new();
    let mut habits = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let object = entry
            .as_object()
            .ok_or_else(|| invalid(format!("habit #{index} is not an object")))?;

        let id = required_text(object, "id")
            .ok_or_else(|| invalid("each habit must have an id and name"))?;
        let name = required_text(object, "name")
            .ok_or_else(|| invalid("each habit must have an id and name"))?;
        let icon = optional_text(object, "icon", index)?;
        let color = optional_text(object, "color", index)?;

        let habit_id =
            HabitId::parse(id).map_err(|err| invalid(format!("habit #{index}: {err}")))?;
        if !seen.insert(habit_id.clone()) {
            return Err(invalid(format!("duplicate habit id `{habit_id}`")));
        }

        let habit = Habit::with_id(habit_id, name, icon, color)
            .map_err(|err| invalid(format!("habit #{index}: {err}")))?;
        habits.push(habit);
    }
    Ok(habits)
}

fn parse_completions(
    entries: &Map<String, Value>,
    habits: &[Habit],
) -> Result<(CompletionsByDate, usize), TransferError> {
    let known: HashSet<&HabitId> = habits.iter().map(|habit| &habit.id).collect();
    let mut completions = CompletionsByDate::new();
    let mut dropped = 0usize;

    for (key, ids) in entries {
        let date = CompletionDate::parse(key).map_err(|err| invalid(err.to_string()))?;
        let ids = ids
            .as_array()
            .ok_or_else(|| invalid(format!("completionData[{key}] must be an array")))?;

        let mut day = BTreeSet::new();
        for id in ids {
            let text = id
                .as_str()
                .ok_or_else(|| invalid(format!("completionData[{key}] must contain strings")))?;
            match HabitId::parse(text) {
                Ok(habit_id) if known.contains(&habit_id) => {
                    day.insert(habit_id);
                }
                _ => dropped += 1,
            }
        }

        if !day.is_empty() {
            completions.insert(date, day);
        }
    }

    Ok((completions, dropped))
}

fn required_text<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    object
        .get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn optional_text<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    index: usize,
) -> Result<Option<&'a str>, TransferError> {
    match object.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.as_str())),
        Some(_) => Err(invalid(format!(
            "habit #{index}: `{field}` must be a string or null"
        ))),
    }
}

fn invalid(message: impl Into<String>) -> TransferError {
    TransferError::InvalidPayload(message.into())
}

#[cfg(test)]
mod tests {
    use super::{export_document, parse_import, TransferError};
    use crate::model::completion::{CompletionDate, CompletionsByDate};
    use crate::model::habit::{Habit, HabitId};
    use crate::repo::snapshot::TrackerSnapshot;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeSet;

    #[test]
    fn rejects_habits_that_are_not_an_array() {
        let err = parse_import(r#"{"habits": "not-an-array", "completionData": {}}"#).unwrap_err();
        assert!(matches!(err, TransferError::InvalidPayload(_)));
    }

    #[test]
    fn rejects_missing_completion_object() {
        let err = parse_import(r#"{"habits": [], "completionData": []}"#).unwrap_err();
        assert!(err.to_string().contains("completionData"));
    }

    #[test]
    fn rejects_habit_without_name() {
        let err = parse_import(r#"{"habits": [{"id": "1"}], "completionData": {}}"#).unwrap_err();
        assert!(err.to_string().contains("id and name"));
    }

    #[test]
    fn rejects_malformed_date_keys() {
        let payload = r#"{
            "habits": [{"id": "1", "name": "Read"}],
            "completionData": {"2024-1-5": ["1"]}
        }"#;
        assert!(parse_import(payload).is_err());
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_import("{not json").unwrap_err();
        assert!(matches!(err, TransferError::InvalidJson(_)));
    }

    #[test]
    fn drops_unknown_references_and_blank_styles() {
        let payload = r#"{
            "habits": [{"id": "1", "name": "Read", "icon": "", "color": null}],
            "completionData": {"2024-01-10": ["1", "ghost", "1"], "2024-01-11": ["ghost"]},
            "exportDate": "whatever"
        }"#;
        let (snapshot, dropped) = parse_import(payload).unwrap();
        assert_eq!(dropped, 2);
        assert_eq!(snapshot.habits[0].icon, None);
        assert_eq!(snapshot.completions.len(), 1);
        let day = CompletionDate::parse("2024-01-10").unwrap();
        assert_eq!(snapshot.completions[&day].len(), 1);
    }

    #[test]
    fn export_orders_ids_by_registry_and_formats_timestamp() {
        let first = Habit::with_id(HabitId::parse("b").unwrap(), "First", None, None).unwrap();
        let second = Habit::with_id(HabitId::parse("a").unwrap(), "Second", None, None).unwrap();
        let mut completions = CompletionsByDate::new();
        completions.insert(
            CompletionDate::parse("2024-01-10").unwrap(),
            [first.id.clone(), second.id.clone()]
                .into_iter()
                .collect::<BTreeSet<_>>(),
        );
        let snapshot = TrackerSnapshot {
            habits: vec![first, second],
            completions,
        };

        let exported_at = Utc.with_ymd_and_hms(2024, 1, 10, 8, 30, 0).unwrap();
        let document = export_document(&snapshot, exported_at);
        assert_eq!(
            document.completion_data["2024-01-10"],
            vec!["b".to_string(), "a".to_string()]
        );
        assert_eq!(document.export_date, "2024-01-10T08:30:00.000Z");

        let json = serde_json::to_value(&document).unwrap();
        assert!(json.get("completionData").is_some());
        assert!(json["habits"][0]["icon"].is_null());
    }
}
