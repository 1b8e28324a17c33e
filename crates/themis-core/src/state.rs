//! Local run record: when the last heartbeat finished and which cases have
//! been handled. Lives at `~/.judgehuman/state.json` and is written only by
//! this process.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const STATE_DIR_NAME: &str = ".judgehuman";
pub const STATE_FILE_NAME: &str = "state.json";

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("Failed to write state file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persisted progress between heartbeats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    /// End of the last completed cycle; `None` before the first
    #[serde(default)]
    pub last_heartbeat: Option<DateTime<Utc>>,
    /// Cases already submitted, in the order they were handled.
    /// Grows without bound.
    #[serde(default)]
    pub judged_ids: Vec<String>,
}

impl RunState {
    /// Whether a heartbeat should run at `now`.
    ///
    /// Always due when forced or before the first run. A `last_heartbeat` in
    /// the future (clock moved backwards) is treated as not yet elapsed.
    pub fn is_due(&self, now: DateTime<Utc>, interval: Duration, force: bool) -> bool {
        let Some(last) = self.last_heartbeat else {
            return true;
        };
        if force {
            return true;
        }
        match now.signed_duration_since(last).to_std() {
            Ok(elapsed) => elapsed >= interval,
            Err(_) => false,
        }
    }

    /// Earliest time the next unforced heartbeat will run
    pub fn next_due(&self, interval: Duration) -> Option<DateTime<Utc>> {
        let last = self.last_heartbeat?;
        chrono::Duration::from_std(interval)
            .ok()
            .and_then(|d| last.checked_add_signed(d))
    }

    pub fn is_judged(&self, case_id: &str) -> bool {
        self.judged_ids.iter().any(|id| id == case_id)
    }

    /// Record a handled case. Returns false if it was already recorded.
    pub fn mark_judged(&mut self, case_id: &str) -> bool {
        if self.is_judged(case_id) {
            return false;
        }
        self.judged_ids.push(case_id.to_string());
        true
    }
}

/// Reads and writes [`RunState`] on disk
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store at the default location under the home directory.
    pub fn new() -> Result<Self, StateError> {
        let home = dirs::home_dir().ok_or(StateError::NoHomeDir)?;
        Ok(Self::with_path(
            home.join(STATE_DIR_NAME).join(STATE_FILE_NAME),
        ))
    }

    /// Store at a custom path (useful for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load state, falling back to an empty record when the file is missing
    /// or unreadable. Never fails: a bad state file only costs re-checking.
    pub fn load(&self) -> RunState {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No state file yet");
                return RunState::default();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read state file, starting fresh");
                return RunState::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt state file, starting fresh");
                RunState::default()
            }
        }
    }

    /// Write state atomically: a temp file beside the target is renamed over it.
    pub fn save(&self, state: &RunState) -> Result<(), StateError> {
        let io_err = |source| StateError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(io_err)?;
        std::fs::rename(&tmp, &self.path).map_err(io_err)?;

        debug!(
            path = %self.path.display(),
            judged = state.judged_ids.len(),
            "Saved state"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    const HOUR: Duration = Duration::from_secs(3600);

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000 + secs, 0).unwrap()
    }

    fn ran_at(secs: i64) -> RunState {
        RunState {
            last_heartbeat: Some(at(secs)),
            judged_ids: vec![],
        }
    }

    #[test]
    fn test_first_run_is_due() {
        assert!(RunState::default().is_due(at(0), HOUR, false));
    }

    #[test]
    fn test_due_exactly_at_interval() {
        let state = ran_at(0);
        assert!(!state.is_due(at(3599), HOUR, false));
        assert!(state.is_due(at(3600), HOUR, false));
        assert!(state.is_due(at(7200), HOUR, false));
    }

    #[test]
    fn test_force_overrides_gate() {
        assert!(ran_at(0).is_due(at(1), HOUR, true));
    }

    #[test]
    fn test_future_timestamp_is_not_due() {
        assert!(!ran_at(100).is_due(at(0), Duration::from_secs(1), false));
    }

    #[test]
    fn test_next_due() {
        assert_eq!(ran_at(0).next_due(HOUR), Some(at(3600)));
        assert_eq!(RunState::default().next_due(HOUR), None);
    }

    #[test]
    fn test_mark_judged_dedups() {
        let mut state = RunState::default();
        assert!(state.mark_judged("A"));
        assert!(state.mark_judged("B"));
        assert!(!state.mark_judged("A"));
        assert_eq!(state.judged_ids, ["A", "B"]);
    }

    #[test]
    fn test_load_missing_file_defaults() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::with_path(dir.path().join("state.json"));
        assert_eq!(store.load(), RunState::default());
    }

    #[test]
    fn test_load_corrupt_file_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(StateStore::with_path(path).load(), RunState::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::with_path(dir.path().join("nested").join("state.json"));
        let mut state = ran_at(0);
        state.mark_judged("A");

        store.save(&state).unwrap();

        assert_eq!(store.load(), state);
        assert!(!dir.path().join("nested").join("state.json.tmp").exists());
    }

    #[test]
    fn test_reads_script_written_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"lastHeartbeat": "2026-01-20T10:00:00.000Z", "judgedIds": ["x1", "x2"]}"#,
        )
        .unwrap();

        let state = StateStore::with_path(path).load();
        assert_eq!(
            state.last_heartbeat,
            Some(Utc.with_ymd_and_hms(2026, 1, 20, 10, 0, 0).unwrap())
        );
        assert_eq!(state.judged_ids, ["x1", "x2"]);
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(RunState::default()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"lastHeartbeat": null, "judgedIds": []})
        );
    }
}
