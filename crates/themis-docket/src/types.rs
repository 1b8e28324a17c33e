use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::warn;

/// Evaluation category a case is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Bench {
    Ethics,
    Humanity,
    Aesthetics,
    Hype,
    Dilemma,
}

impl Bench {
    /// Every bench, in the order verdicts list them
    pub const ALL: [Bench; 5] = [
        Bench::Ethics,
        Bench::Humanity,
        Bench::Aesthetics,
        Bench::Hype,
        Bench::Dilemma,
    ];

    /// Bench used when a case names none, or one we do not know
    pub const DEFAULT: Bench = Bench::Dilemma;

    pub fn as_str(&self) -> &'static str {
        match self {
            Bench::Ethics => "ETHICS",
            Bench::Humanity => "HUMANITY",
            Bench::Aesthetics => "AESTHETICS",
            Bench::Hype => "HYPE",
            Bench::Dilemma => "DILEMMA",
        }
    }

    /// One-line guide to what the bench judges
    pub fn description(&self) -> &'static str {
        match self {
            Bench::Ethics => "Harm, fairness, consent, accountability",
            Bench::Humanity => "Authenticity, lived experience vs performative",
            Bench::Aesthetics => "Craft, originality, emotional impact",
            Bench::Hype => "Substance vs marketing spin",
            Bench::Dilemma => "Moral complexity and competing principles",
        }
    }

    /// Case-insensitive lookup that falls back to [`Bench::DEFAULT`].
    pub fn parse_lenient(name: Option<&str>) -> Bench {
        name.and_then(|n| n.parse().ok()).unwrap_or(Self::DEFAULT)
    }
}

impl std::fmt::Display for Bench {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Bench {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Bench::ALL
            .into_iter()
            .find(|b| b.as_str() == upper)
            .ok_or_else(|| format!("Unknown bench: {}", s))
    }
}

/// A third-party verdict already attached to a case.
///
/// The service has sent scores as numbers and as strings; any non-null
/// value counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiVerdict {
    #[serde(default)]
    pub score: Option<Value>,
}

/// One item on the docket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub exhibit: String,
    #[serde(default, deserialize_with = "name_or_none")]
    pub bench: Option<String>,
    #[serde(default)]
    pub ai_verdict: Option<AiVerdict>,
}

impl Case {
    pub fn new(id: impl Into<String>, title: impl Into<String>, exhibit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            exhibit: exhibit.into(),
            bench: None,
            ai_verdict: None,
        }
    }

    pub fn with_bench(mut self, bench: impl Into<String>) -> Self {
        self.bench = Some(bench.into());
        self
    }

    pub fn with_ai_score(mut self, score: f64) -> Self {
        self.ai_verdict = Some(AiVerdict {
            score: Some(Value::from(score)),
        });
        self
    }

    /// Primary bench, defaulted when missing or unrecognised
    pub fn bench(&self) -> Bench {
        Bench::parse_lenient(self.bench.as_deref())
    }

    /// Whether there is a scored third-party verdict to agree with
    pub fn has_ai_verdict(&self) -> bool {
        self.ai_verdict
            .as_ref()
            .and_then(|v| v.score.as_ref())
            .is_some_and(|score| !score.is_null())
    }
}

/// Response of `GET /api/docket`.
///
/// Entries that do not decode as a [`Case`] are dropped with a warning so
/// one bad case cannot block the rest of the docket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Docket {
    #[serde(default, deserialize_with = "case_or_none")]
    pub case_of_day: Option<Case>,
    #[serde(default, deserialize_with = "cases_skipping_invalid")]
    pub docket: Vec<Case>,
}

impl Docket {
    /// All cases, case of the day first, deduplicated by id keeping the
    /// first occurrence.
    pub fn cases(&self) -> Vec<&Case> {
        let mut seen = HashSet::new();
        self.case_of_day
            .iter()
            .chain(self.docket.iter())
            .filter(|c| seen.insert(c.id.as_str()))
            .collect()
    }

    /// Cases not yet handled, in docket order
    pub fn unseen(&self, is_judged: impl Fn(&str) -> bool) -> Vec<Case> {
        self.cases()
            .into_iter()
            .filter(|c| !is_judged(&c.id))
            .cloned()
            .collect()
    }
}

fn decode_case(raw: Value) -> Option<Case> {
    if raw.is_null() {
        return None;
    }
    match serde_json::from_value(raw) {
        Ok(case) => Some(case),
        Err(e) => {
            warn!(error = %e, "Skipping undecodable docket entry");
            None
        }
    }
}

fn case_or_none<'de, D>(deserializer: D) -> Result<Option<Case>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(decode_case))
}

fn cases_skipping_invalid<'de, D>(deserializer: D) -> Result<Vec<Case>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.into_iter().filter_map(decode_case).collect())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "case id must be a string or number, got {}",
            other
        ))),
    }
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => String::new(),
        Value::String(s) => s,
        other => other.to_string(),
    })
}

fn name_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

/// Response of `GET /api/agent/status`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    #[serde(default)]
    pub agent: Option<AgentInfo>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub stats: Option<AgentStats>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStats {
    #[serde(default)]
    pub total_votes: Option<u64>,
}

impl AgentStatus {
    /// Only an explicit `isActive: false` counts as inactive. The flag is read
    /// from the nested `agent` object when present.
    pub fn is_active(&self) -> bool {
        let flag = match &self.agent {
            Some(agent) => agent.is_active,
            None => self.is_active,
        };
        flag != Some(false)
    }

    pub fn total_votes(&self) -> Option<u64> {
        self.stats.as_ref().and_then(|s| s.total_votes)
    }
}

/// Response of `GET /api/agent/humanity-index`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanityIndex {
    #[serde(default)]
    pub humanity_index: Option<f64>,
    #[serde(default)]
    pub daily_delta: Option<f64>,
    #[serde(default)]
    pub hot_splits: Option<Vec<serde_json::Value>>,
}

impl HumanityIndex {
    pub fn hot_split_count(&self) -> usize {
        self.hot_splits.as_ref().map_or(0, Vec::len)
    }
}

/// Response of `POST /api/agent/verdict`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictReceipt {
    #[serde(default)]
    pub aggregate_score: Option<f64>,
}
