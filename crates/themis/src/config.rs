//! Configuration for the heartbeat binary.
//!
//! Layers, lowest first: built-in defaults, `~/.judgehuman/config.toml`,
//! environment variables, command-line flags.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use themis_agent::EvaluatorEnv;
use themis_core::{DEFAULT_INTERVAL, STATE_DIR_NAME};
use themis_docket::DEFAULT_BASE_URL;

/// The config file name, inside the state directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const API_KEY_VAR: &str = "JUDGEHUMAN_API_KEY";
pub const BASE_URL_VAR: &str = "JUDGEHUMAN_BASE_URL";
/// Heartbeat interval in whole seconds
pub const INTERVAL_VAR: &str = "JUDGEHUMAN_HEARTBEAT_INTERVAL";

/// Optional settings file
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Case service origin
    pub base_url: Option<String>,
    /// Minimum time between heartbeats, e.g. `"30m"`
    #[serde(default, with = "humantime_serde")]
    pub interval: Option<Duration>,
    pub state_file: Option<PathBuf>,
    /// Custom evaluator command line
    pub eval_cmd: Option<String>,
}

impl FileConfig {
    /// Default location under the home directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(STATE_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the config file.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to read or parse (hard error)
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }
}

/// Effective settings after layering. Holds credentials, so no `Debug`.
#[derive(Clone)]
pub struct Settings {
    pub base_url: String,
    pub api_key: Option<String>,
    pub interval: Duration,
    /// `None` means the default state location
    pub state_file: Option<PathBuf>,
    pub evaluator: EvaluatorEnv,
}

impl Settings {
    /// Layer the file config and environment. `state_file` is the
    /// command-line override.
    pub fn resolve(
        file: Option<FileConfig>,
        lookup: impl Fn(&str) -> Option<String>,
        state_file: Option<PathBuf>,
    ) -> Result<Self> {
        let file = file.unwrap_or_default();
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let interval = match get(INTERVAL_VAR) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().with_context(|| {
                    format!("{} must be a number of seconds, got {:?}", INTERVAL_VAR, raw)
                })?;
                Duration::from_secs(secs)
            }
            None => file.interval.unwrap_or(DEFAULT_INTERVAL),
        };

        let mut evaluator = EvaluatorEnv::from_lookup(&lookup);
        if evaluator.eval_cmd.is_none() {
            evaluator.eval_cmd = file.eval_cmd.filter(|cmd| !cmd.trim().is_empty());
        }

        Ok(Self {
            base_url: get(BASE_URL_VAR)
                .or(file.base_url)
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: get(API_KEY_VAR),
            interval,
            state_file: state_file.or(file.state_file),
            evaluator,
        })
    }
}
