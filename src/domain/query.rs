use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};

/// Result statuses that make an action a ticket candidate. Compared against
/// the lowercased status string, so entries must stay lowercase.
pub const FAILURE_STATUSES: &[&str] = &[
    "failed",
    "locked",
    "user cancelled",
    "download failed",
    "expired before execution",
    "error",
    "transcoding error",
    "hash mismatch",
    "disk free limited",
    "disk limited",
    "invalid signature",
];

/// Operators exclude an action from ticketing by putting this marker in its name.
pub const EXCLUSION_MARKER: &str = "(test)";

/// Builds the session relevance query selecting failed results of top-level
/// actions issued within the last `days` days.
///
/// Each row of the answer has the shape
/// `(action id, action name, multiple flag, ((sub id, sub name), status,
/// start time, end time, (computer id, computer name)))`, which is what
/// [`crate::domain::failure::FailureRecord::from_row`] expects.
pub fn failed_actions_query(days: u32) -> String {
    let statuses = FAILURE_STATUSES
        .iter()
        .map(|status| format!("\"{status}\""))
        .collect::<Vec<_>>()
        .join("; ");

    let result_fields = "(id of it, name of it) of action of it, status of it, \
         start time of it, end time of it, (id of it, name of it) of computer of it";

    format!(
        "(id of it, name of it, multiple flag of it, ({result_fields}) of results whose \
         ((status of it as string as lowercase) is contained by set of ({statuses}) \
         and (end time of it > (now - {days}*day))) of (it; member actions of it)) \
         of bes actions whose (name of it as lowercase does not contain \"{EXCLUSION_MARKER}\" \
         and not exists parent group of it and time issued of it > now - {days}*day)"
    )
}

/// Raw answer of the query endpoint.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl QueryResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[derive(Deserialize)]
struct QueryAnswer {
    result: Vec<Value>,
}

/// Extracts the rows from a `{"result": [...]}` answer of the query endpoint.
pub fn parse_query_result(body: &str) -> AppResult<Vec<Value>> {
    let answer: QueryAnswer = serde_json::from_str(body)
        .map_err(|err| AppError::Source(format!("unusable query answer: {err}")))?;
    Ok(answer.result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_stable_query_text() {
        let expected = concat!(
            "(id of it, name of it, multiple flag of it, ((id of it, name of it) of action of it, ",
            "status of it, start time of it, end time of it, (id of it, name of it) of computer of it) ",
            "of results whose ((status of it as string as lowercase) is contained by set of ",
            "(\"failed\"; \"locked\"; \"user cancelled\"; \"download failed\"; ",
            "\"expired before execution\"; \"error\"; \"transcoding error\"; \"hash mismatch\"; ",
            "\"disk free limited\"; \"disk limited\"; \"invalid signature\") ",
            "and (end time of it > (now - 7*day))) of (it; member actions of it)) ",
            "of bes actions whose (name of it as lowercase does not contain \"(test)\" ",
            "and not exists parent group of it and time issued of it > now - 7*day)"
        );
        assert_eq!(failed_actions_query(7), expected);
    }

    #[test]
    fn substitutes_window_exactly_twice() {
        for days in [1, 3, 30, 365] {
            let query = failed_actions_query(days);
            assert_eq!(query.matches(&format!("now - {days}*day")).count(), 2);
            assert_eq!(query.matches("*day").count(), 2);
        }
    }

    #[test]
    fn differs_only_in_window() {
        let short = failed_actions_query(2);
        let long = failed_actions_query(90);
        assert_eq!(short.replace("2*day", "90*day"), long);
    }

    #[test]
    fn statuses_are_lowercase() {
        for status in FAILURE_STATUSES {
            assert_eq!(*status, status.to_lowercase());
        }
    }

    #[test]
    fn extracts_result_rows() {
        let rows = parse_query_result(r#"{"result": [[1, "a"], [2, "b"]], "plural": true}"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][1], "b");

        assert!(parse_query_result(r#"{"result": []}"#).unwrap().is_empty());
    }

    #[test]
    fn rejects_answer_without_rows() {
        let err = parse_query_result(r#"{"error": "bad relevance"}"#).unwrap_err();
        assert!(matches!(err, AppError::Source(_)));

        let err = parse_query_result("<html>oops</html>").unwrap_err();
        assert!(matches!(err, AppError::Source(_)));
    }
}
