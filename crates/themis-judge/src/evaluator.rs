use themis_agent::{Agent, AgentConfig, AgentError};
use themis_docket::Case;
use tracing::{debug, info};

use crate::{JudgePrompts, Verdict, VerdictParseError};

/// Runs a case through an evaluator backend and parses the verdict
pub struct JudgeEvaluator<'a> {
    agent: &'a dyn Agent,
}

impl<'a> JudgeEvaluator<'a> {
    pub fn new(agent: &'a dyn Agent) -> Self {
        Self { agent }
    }

    /// Build the prompt, run the backend once, and parse its output.
    pub async fn evaluate(&self, case: &Case, config: &AgentConfig) -> Result<Verdict, JudgeError> {
        let prompt = JudgePrompts::build_evaluation_prompt(case);

        debug!(
            case_id = %case.id,
            agent = self.agent.name(),
            prompt_len = prompt.len(),
            "Running judge evaluation"
        );

        let output = self.agent.execute(&prompt, config).await?;

        info!(
            case_id = %case.id,
            exit_code = output.exit_code,
            duration_secs = output.duration.as_secs_f64(),
            "Evaluator completed"
        );

        if !output.success() {
            return Err(JudgeError::ExitStatus {
                code: output.exit_code,
                stderr: output.stderr_summary().unwrap_or_default().to_string(),
            });
        }

        Ok(Verdict::parse(&output.stdout)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    #[error("Evaluator error: {0}")]
    Agent(#[from] AgentError),

    #[error("Evaluator exited with code {code}: {stderr}")]
    ExitStatus { code: i32, stderr: String },

    #[error("Failed to parse verdict: {0}")]
    Parse(#[from] VerdictParseError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;
    use themis_agent::{AgentOutput, AgentType};

    /// Agent that replays a canned output and records the prompt it saw
    struct CannedAgent {
        output: AgentOutput,
        seen: Mutex<Option<String>>,
    }

    impl CannedAgent {
        fn new(stdout: &str, exit_code: i32) -> Self {
            Self {
                output: AgentOutput::new(
                    stdout.to_string(),
                    "model overloaded".to_string(),
                    exit_code,
                    Duration::from_millis(1),
                ),
                seen: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl Agent for CannedAgent {
        fn name(&self) -> &str {
            "canned"
        }

        fn agent_type(&self) -> AgentType {
            AgentType::CustomCommand
        }

        async fn execute(
            &self,
            prompt: &str,
            _config: &AgentConfig,
        ) -> Result<AgentOutput, AgentError> {
            *self.seen.lock().unwrap() = Some(prompt.to_string());
            Ok(self.output.clone())
        }

        async fn is_available(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn test_evaluate_parses_verdict() {
        let agent = CannedAgent::new(r#"```json
{"benchScores":{"ETHICS":3},"score":22,"reasoning":["misleading"]}
```"#, 0);
        let case = Case::new("c-9", "Miracle diet", "Lose 20kg in a week").with_bench("hype");

        let verdict = JudgeEvaluator::new(&agent)
            .evaluate(&case, &AgentConfig::default())
            .await
            .unwrap();

        assert_eq!(verdict.score(), Some(22.0));
        let prompt = agent.seen.lock().unwrap().clone().unwrap();
        assert_eq!(prompt, JudgePrompts::build_evaluation_prompt(&case));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_error() {
        let agent = CannedAgent::new(r#"{"score": 1}"#, 1);
        let err = JudgeEvaluator::new(&agent)
            .evaluate(&Case::new("c", "t", "e"), &AgentConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::ExitStatus { code: 1, .. }));
        assert_eq!(err.to_string(), "Evaluator exited with code 1: model overloaded");
    }

    #[tokio::test]
    async fn test_unparseable_output_is_error() {
        let agent = CannedAgent::new("no json here", 0);
        let err = JudgeEvaluator::new(&agent)
            .evaluate(&Case::new("c", "t", "e"), &AgentConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, JudgeError::Parse(_)));
    }
}
