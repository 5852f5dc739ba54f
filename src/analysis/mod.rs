mod report;

pub use report::{
    AnalysisReport, Distribution, DocumentSummary, ReviewSection, RiskItem, RiskScore,
    RiskSection, SectionRisk, Severity, Suggestion,
};

use serde_json::Value;

/// Analysis payload as returned by the service. The upload path never looks
/// inside it; display code goes through [`AnalysisReport`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult(Value);

impl AnalysisResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn report(&self) -> AnalysisReport {
        AnalysisReport::from_result(self)
    }
}
