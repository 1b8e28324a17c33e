use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw output captured from one evaluator invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOutput {
    /// Raw model text (process stdout, or the hosted response text)
    pub stdout: String,
    /// Process stderr; empty for hosted evaluators
    pub stderr: String,
    /// Exit code from the process; 0 for hosted evaluators
    pub exit_code: i32,
    /// Duration of execution
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl AgentOutput {
    pub fn new(stdout: String, stderr: String, exit_code: i32, duration: Duration) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            duration,
        }
    }

    /// Output from a hosted backend, which has no process status
    pub fn from_text(text: String, duration: Duration) -> Self {
        Self::new(text, String::new(), 0, duration)
    }

    /// Check if the evaluator exited successfully
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// First non-empty stderr line, for error messages
    pub fn stderr_summary(&self) -> Option<&str> {
        self.stderr.lines().map(str::trim).find(|l| !l.is_empty())
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}
