use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use tracing::warn;

use super::AnalysisResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    #[default]
    Unknown,
}

impl Severity {
    pub const RANKED: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
            Severity::Unknown => "Unknown",
        }
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" => Severity::Low,
            "medium" => Severity::Medium,
            "high" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(label) => Ok(Severity::from(label)),
            _ => Ok(Severity::Unknown),
        }
    }
}

/// The service sends either a number or a label such as "Medium (65/100)".
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RiskScore {
    Numeric(f64),
    Label(String),
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskScore::Numeric(score) => write!(f, "{:.0}/100", score),
            RiskScore::Label(label) => f.write_str(label),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReviewSection {
    pub document_type: Option<String>,
    #[serde(deserialize_with = "lenient_count")]
    pub pages: Option<u32>,
    pub clauses: Vec<Value>,
    pub document_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskItem {
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    pub severity: Severity,
    #[serde(deserialize_with = "lenient_text")]
    pub clause: String,
    #[serde(deserialize_with = "lenient_count")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RiskSection {
    pub score: Option<RiskScore>,
    #[serde(deserialize_with = "lenient_list")]
    pub risky_clauses: Vec<RiskItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Suggestion {
    #[serde(deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(deserialize_with = "lenient_text")]
    pub title: String,
    #[serde(deserialize_with = "lenient_text")]
    pub description: String,
    #[serde(alias = "originalText", deserialize_with = "lenient_text")]
    pub original_text: String,
    #[serde(alias = "suggestedText", deserialize_with = "lenient_text")]
    pub suggested_text: String,
    #[serde(deserialize_with = "lenient_text")]
    pub clause: String,
    #[serde(deserialize_with = "lenient_count")]
    pub page: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct SuggestionsSection {
    #[serde(deserialize_with = "lenient_list")]
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Distribution {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

impl Distribution {
    pub fn entries(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.data.iter().copied())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SectionRisk {
    pub name: String,
    pub risk_level: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocumentSummary {
    pub title: String,
    #[serde(rename = "type")]
    pub document_type: String,
    pub parties: Vec<String>,
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
    pub status: Option<String>,
    #[serde(deserialize_with = "lenient_score")]
    pub risk_score: Option<f64>,
    #[serde(deserialize_with = "lenient_list")]
    pub key_findings: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    pub sections: Vec<SectionRisk>,
    pub risk_distribution: Option<Distribution>,
    pub section_distribution: Option<Distribution>,
}

/// Typed view of an [`AnalysisResult`]. Each section is read on its own, so a
/// malformed section falls back to its default without hiding the others, and
/// within a section bad list entries are skipped one by one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisReport {
    pub review: ReviewSection,
    pub risk: RiskSection,
    pub suggestions: Vec<Suggestion>,
    pub summary: Option<DocumentSummary>,
}

impl AnalysisReport {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let root = result.as_value();
        Self {
            review: section(root, "review"),
            risk: section(root, "risk"),
            suggestions: section::<SuggestionsSection>(root, "suggestions").suggestions,
            summary: section(root, "summary"),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.summary
            .as_ref()
            .map(|s| s.title.as_str())
            .filter(|t| !t.is_empty())
            .or(self.review.document_type.as_deref())
    }

    pub fn risk_label(&self) -> Option<String> {
        if let Some(score) = &self.risk.score {
            return Some(score.to_string());
        }
        self.summary
            .as_ref()
            .and_then(|s| s.risk_score)
            .map(|score| RiskScore::Numeric(score).to_string())
    }

    pub fn severity_counts(&self) -> [(Severity, usize); 4] {
        Severity::RANKED.map(|severity| {
            let count = self
                .risk
                .risky_clauses
                .iter()
                .filter(|r| r.severity == severity)
                .count();
            (severity, count)
        })
    }

    /// The summary's distribution if the service sent one, otherwise counts
    /// derived from the risky clauses.
    pub fn risk_distribution(&self) -> Distribution {
        if let Some(distribution) = self
            .summary
            .as_ref()
            .and_then(|s| s.risk_distribution.clone())
        {
            return distribution;
        }

        let counts = self.severity_counts();
        Distribution {
            labels: counts.iter().map(|(s, _)| s.label().to_string()).collect(),
            data: counts.iter().map(|(_, c)| *c as f64).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == AnalysisReport::default()
    }
}

// The agents behind the service build these payloads from LLM text, so
// numbers often arrive as strings and single entries can be malformed.

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Keeps the entries that parse; a bad entry is logged and skipped.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            warn!("Expected a list, ignoring {}", other);
            return Ok(Vec::new());
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping malformed entry: {}", e);
                None
            }
        })
        .collect())
}

fn section<T: DeserializeOwned + Default>(root: &Value, key: &str) -> T {
    match root.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
            warn!("Ignoring malformed {} section: {}", key, e);
            T::default()
        }),
    }
}
