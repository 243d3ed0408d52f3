//! JSON Output

use crate::batch::BatchReport;
use crate::render::RenderedOutcome;

/// Generate a prettified JSON batch report
pub fn generate_json_report(report: &BatchReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

/// Serialize one rendered outcome
pub fn generate_json_outcome(outcome: &RenderedOutcome) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(outcome)
}
