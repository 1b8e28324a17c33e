mod evaluator;
mod prompts;
mod verdict;

pub use evaluator::{JudgeError, JudgeEvaluator};
pub use prompts::{JudgePrompts, MAX_REASONS, MAX_REASON_CHARS};
pub use verdict::{Verdict, VerdictParseError};
