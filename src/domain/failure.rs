use std::fmt;

use serde_json::Value;

use crate::error::{AppError, AppResult};

/// One failed result of a top-level action, flattened from a query row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub action_id: u64,
    pub action_name: String,
    pub multiple_action_group: bool,
    pub sub_action_id: u64,
    pub sub_action_name: String,
    pub status: String,
    pub start_time: String,
    pub end_time: String,
    pub computer_id: u64,
    pub computer_name: String,
}

impl FailureRecord {
    /// Flattens a row shaped as
    /// `[actionId, actionName, isMulti, [[subId, subName], status, start, end, [compId, compName]]]`.
    ///
    /// Only the first result tuple is read, even for multiple action groups.
    pub fn from_row(row: &Value) -> AppResult<Self> {
        if !row.is_array() {
            return Err(malformed("row is not an array", row));
        }

        Ok(Self {
            action_id: id_at(row, &[0], "action id")?,
            action_name: text_at(row, &[1], "action name")?,
            multiple_action_group: flag_at(row, &[2], "multiple action flag")?,
            sub_action_id: id_at(row, &[3, 0, 0], "sub-action id")?,
            sub_action_name: text_at(row, &[3, 0, 1], "sub-action name")?,
            status: text_at(row, &[3, 1], "status")?,
            start_time: text_at(row, &[3, 2], "start time")?,
            end_time: text_at(row, &[3, 3], "end time")?,
            computer_id: id_at(row, &[3, 4, 0], "computer id")?,
            computer_name: text_at(row, &[3, 4, 1], "computer name")?,
        })
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey::new(self.action_id, self.computer_id)
    }
}

/// `<actionId>-<computerId>`: one ticket per action per computer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DedupKey(String);

impl DedupKey {
    pub fn new(action_id: u64, computer_id: u64) -> Self {
        Self(format!("{action_id}-{computer_id}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn value_at<'a>(row: &'a Value, path: &[usize]) -> Option<&'a Value> {
    path.iter()
        .try_fold(row, |current, index| current.as_array()?.get(*index))
}

fn id_at(row: &Value, path: &[usize], field: &str) -> AppResult<u64> {
    match value_at(row, path) {
        Some(value) => value
            .as_u64()
            .ok_or_else(|| malformed(&format!("{field} at {path:?} is not an integer"), row)),
        None => Err(malformed(&format!("{field} missing at {path:?}"), row)),
    }
}

fn text_at(row: &Value, path: &[usize], field: &str) -> AppResult<String> {
    match value_at(row, path) {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(malformed(&format!("{field} at {path:?} is not a string"), row)),
        None => Err(malformed(&format!("{field} missing at {path:?}"), row)),
    }
}

fn flag_at(row: &Value, path: &[usize], field: &str) -> AppResult<bool> {
    match value_at(row, path) {
        Some(Value::Bool(flag)) => Ok(*flag),
        Some(_) => Err(malformed(&format!("{field} at {path:?} is not a boolean"), row)),
        None => Err(malformed(&format!("{field} missing at {path:?}"), row)),
    }
}

fn malformed(reason: &str, row: &Value) -> AppError {
    AppError::MalformedRow(format!("{reason}: {row}"))
}
