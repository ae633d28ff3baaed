use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::domain::failure::DedupKey;
use crate::error::{AppError, AppResult};

/// Persisted set of failures that already produced a ticket, keyed by
/// [`DedupKey`] with the Unix time (seconds) the ticket was handled.
pub struct DedupStore {
    file_path: PathBuf,
    entries: BTreeMap<String, f64>,
}

impl DedupStore {
    /// Reads the store at `path`.
    ///
    /// A missing file is the first-run state and a file that does not parse
    /// is treated the same way. Other I/O failures are returned.
    pub fn load(path: &Path) -> AppResult<Self> {
        let entries = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, f64>>(&contents) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(path = %path.display(), "ignoring unreadable dedup store: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == ErrorKind::InvalidData => {
                warn!(path = %path.display(), "ignoring unreadable dedup store: {err}");
                BTreeMap::new()
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no dedup store yet, starting empty");
                BTreeMap::new()
            }
            Err(err) => {
                return Err(AppError::Store(format!(
                    "failed to read {}: {err}",
                    path.display()
                )));
            }
        };

        Ok(Self {
            file_path: path.to_path_buf(),
            entries,
        })
    }

    pub fn contains(&self, key: &DedupKey) -> bool {
        self.entries.contains_key(key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts or refreshes `key`, then rewrites the whole file.
    pub fn record_and_persist(&mut self, key: &DedupKey, timestamp: f64) -> AppResult<()> {
        self.entries.insert(key.as_str().to_string(), timestamp);
        self.save()
    }

    fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.entries)
            .map_err(|err| AppError::Store(format!("failed to encode dedup store: {err}")))?;
        fs::write(&self.file_path, data).map_err(|err| {
            AppError::Store(format!("failed to write {}: {err}", self.file_path.display()))
        })?;
        Ok(())
    }
}
