use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Field a CLI-style backend wraps its real answer in
/// (`claude --output-format json` emits `{"result": "..."}`).
const ENVELOPE_FIELD: &str = "result";

/// A judgment recovered from model output.
///
/// Kept as the decoded JSON object: the case service owns the schema, so
/// every field the model produced is forwarded as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Verdict(Map<String, Value>);

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VerdictParseError {
    #[error("Evaluator returned empty output")]
    Empty,

    #[error("Could not parse evaluator JSON response: no object found in {preview:?}")]
    NoJsonObject { preview: String },
}

impl Verdict {
    /// Recover a verdict from raw evaluator output.
    ///
    /// Steps, first success wins:
    /// 1. strip code fences
    /// 2. decode the whole text as an object, unwrapping `{"result": ...}`
    ///    envelopes down to the innermost object that decodes
    /// 3. decode the span from the first `{` to the last `}`
    pub fn parse(raw: &str) -> Result<Self, VerdictParseError> {
        debug!(output_len = raw.len(), "Parsing verdict");

        if raw.trim().is_empty() {
            return Err(VerdictParseError::Empty);
        }

        recover_object(raw)
            .map(Self)
            .ok_or_else(|| VerdictParseError::NoJsonObject {
                preview: raw.chars().take(80).collect(),
            })
    }

    /// Composite score, if the model supplied a numeric one
    pub fn score(&self) -> Option<f64> {
        self.0.get("score").and_then(Value::as_f64)
    }

    pub fn bench_scores(&self) -> Option<&Map<String, Value>> {
        self.0.get("benchScores").and_then(Value::as_object)
    }

    pub fn reasoning(&self) -> Vec<&str> {
        self.0
            .get("reasoning")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Get a short description of the verdict for logging
    pub fn short_description(&self) -> String {
        let score = self
            .score()
            .map(|s| s.to_string())
            .unwrap_or_else(|| "?".to_string());
        format!("score {} ({} reasons)", score, self.reasoning().len())
    }
}

fn recover_object(text: &str) -> Option<Map<String, Value>> {
    let cleaned = strip_code_fences(text);
    decode_object(&cleaned)
        .map(unwrap_envelope)
        .or_else(|| scan_braces(&cleaned))
}

fn strip_code_fences(text: &str) -> String {
    text.replace("```json\n", "")
        .replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

fn decode_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(text).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

fn unwrap_envelope(outer: Map<String, Value>) -> Map<String, Value> {
    let inner = match outer.get(ENVELOPE_FIELD) {
        Some(Value::String(text)) => recover_object(text),
        Some(Value::Object(map)) => Some(map.clone()),
        _ => None,
    };
    match inner {
        Some(inner) => {
            debug!("Unwrapped verdict envelope");
            unwrap_envelope(inner)
        }
        None => outer,
    }
}

fn scan_braces(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    debug!(start, end, "Falling back to brace scan");
    decode_object(&text[start..=end])
}
