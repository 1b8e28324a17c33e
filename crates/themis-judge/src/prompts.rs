use themis_docket::{Bench, Case};

/// Upper bound on reasoning strings requested per verdict
pub const MAX_REASONS: usize = 3;

/// Upper bound on characters per reasoning string
pub const MAX_REASON_CHARS: usize = 200;

/// Prompt templates for the judge
pub struct JudgePrompts;

impl JudgePrompts {
    /// Build the evaluation prompt for a case.
    ///
    /// Deterministic: the same case always yields the same text.
    pub fn build_evaluation_prompt(case: &Case) -> String {
        let bench = case.bench();

        format!(
            r#"You are Themis, an impartial AI judge on JudgeHuman. Evaluate this case.

Primary bench: {bench} — {description}
Title: {title}
Exhibit: {exhibit}

Score all five benches 1–10:
1–2 = seriously problematic | 3–4 = below average | 5–6 = neutral | 7–8 = commendable | 9–10 = exceptional

Compute an overall composite score 0–100.
Give up to {max_reasons} concise reasoning strings (max {max_chars} chars each).

Reply ONLY with valid JSON, no markdown:
{template}"#,
            bench = bench,
            description = bench.description(),
            title = case.title,
            exhibit = case.exhibit,
            max_reasons = MAX_REASONS,
            max_chars = MAX_REASON_CHARS,
            template = response_template(),
        )
    }
}

/// The single-line JSON shape the judge must reply with
fn response_template() -> String {
    let scores = Bench::ALL
        .iter()
        .map(|b| format!("\"{}\":0", b))
        .collect::<Vec<_>>()
        .join(",");
    format!(
        r#"{{"benchScores":{{{}}},"score":0,"reasoning":["..."]}}"#,
        scores
    )
}
