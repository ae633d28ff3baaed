use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

use crate::domain::failure::DedupKey;
use crate::domain::ticket::TicketPayload;
use crate::error::AppResult;

pub const SEPARATOR: &str = "---------------------------------";
pub const TERMINATION_MARKER: &str = "Normal termination";

/// Human-readable transcript of one run. Nothing reads it back.
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    /// Truncates the transcript at `path` and writes the run header.
    pub fn start(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        writeln!(
            file,
            "genticket run at {}",
            Utc::now().format("%a %b %e %H:%M:%S %Y")
        )?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `text` followed by a newline. Failures only produce a warning.
    pub fn write(&self, text: &str) {
        let result = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{text}"));
        if let Err(err) = result {
            warn!(path = %self.path.display(), "failed to append to run log: {err}");
        }
    }

    pub fn section(&self, title: &str, body: &str) {
        self.write(&format!("{SEPARATOR}\n{title}\n{body}\n{SEPARATOR}"));
    }

    pub fn finish(&self) {
        self.write(TERMINATION_MARKER);
    }
}

/// Path of the payload log for one dedup key: `SNAPI-<actionId>-<computerId>.json`.
pub fn ticket_artifact_path(dir: &Path, key: &DedupKey) -> PathBuf {
    dir.join(format!("SNAPI-{key}.json"))
}

/// Appends the pretty-printed payload to the key's artifact file. Successive
/// payloads are concatenated without an enclosing array.
pub fn append_ticket_artifact(dir: &Path, key: &DedupKey, payload: &TicketPayload) -> AppResult<()> {
    let data = serde_json::to_string_pretty(payload).map_err(std::io::Error::other)?;
    let mut file = OpenOptions::new()
        .append(true)
        .create(true)
        .open(ticket_artifact_path(dir, key))?;
    writeln!(file, "{data}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::Deserializer;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn start_truncates_previous_transcript() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("servicenow-results.log");
        fs::write(&path, "stale content from an earlier run\n").unwrap();

        let log = RunLog::start(&path).unwrap();
        log.section("BigFix query and results:", "Query:\nnames of bes computers");
        log.finish();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("genticket run at "));
        assert!(!contents.contains("stale content"));
        assert!(contents.contains("Query:\nnames of bes computers"));
        assert!(contents.trim_end().ends_with(TERMINATION_MARKER));
    }

    #[test]
    fn artifacts_concatenate_payloads() {
        let dir = TempDir::new().unwrap();
        let key = DedupKey::new(100, 55);
        let payload = TicketPayload {
            description: "d".to_string(),
            short_description: "s".to_string(),
            urgency: "2".to_string(),
            cmdb_ci: "host-55".to_string(),
        };

        append_ticket_artifact(dir.path(), &key, &payload).unwrap();
        append_ticket_artifact(dir.path(), &key, &payload).unwrap();

        let path = ticket_artifact_path(dir.path(), &key);
        assert_eq!(path.file_name().unwrap(), "SNAPI-100-55.json");

        let contents = fs::read_to_string(path).unwrap();
        let payloads = Deserializer::from_str(&contents)
            .into_iter::<TicketPayload>()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(payloads, vec![payload.clone(), payload]);
    }
}
