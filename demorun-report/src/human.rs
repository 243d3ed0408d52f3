//! Terminal Formatting
//!
//! Human-readable text for unit listings, single outcomes and batch summaries.

use crate::batch::{BatchEntryResult, BatchReport};
use crate::render::RenderedOutcome;
use demorun_core::{ExampleUnit, ExecutionStatus};

fn status_icon(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Success => "✓",
        ExecutionStatus::Failure => "✗",
        ExecutionStatus::Timeout => "⏱",
        ExecutionStatus::SpawnError => "💥",
        ExecutionStatus::NotFound => "?",
    }
}

/// Format the unit listing as an aligned table
pub fn format_unit_list(units: &[ExampleUnit]) -> String {
    let mut output = String::new();
    let width = units
        .iter()
        .map(|u| u.display_name.len())
        .max()
        .unwrap_or(0);

    for unit in units {
        output.push_str(&format!(
            "  {:<width$}  {}\n",
            unit.display_name,
            unit.identifier,
            width = width
        ));
    }
    output.push_str(&format!("{} examples found.\n", units.len()));
    output
}

/// Format one rendered outcome
pub fn format_human_outcome(rendered: &RenderedOutcome) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{} {} - Output\n",
        status_icon(rendered.status),
        rendered.title
    ));
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "status: {}  duration: {} ms",
        rendered.status, rendered.duration_ms
    ));
    if let Some(code) = rendered.exit_code {
        output.push_str(&format!("  exit code: {}", code));
    }
    output.push('\n');
    output.push_str(&rendered.headline);
    output.push_str("\n\n");
    output.push_str(&rendered.body);
    if !rendered.body.is_empty() && !rendered.body.ends_with('\n') {
        output.push('\n');
    }
    output
}

/// Format the batch summary table
pub fn format_human_batch(report: &BatchReport) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("Batch Results\n");
    output.push_str(&"=".repeat(60));
    output.push('\n');

    let width = report
        .entries
        .iter()
        .map(|e| e.unit_id.len())
        .max()
        .unwrap_or(20);

    for entry in &report.entries {
        match &entry.result {
            BatchEntryResult::Skipped { reason } => {
                output.push_str(&format!(
                    "  ⊘ {:<width$}  SKIPPED      {}\n",
                    entry.unit_id,
                    reason,
                    width = width
                ));
            }
            BatchEntryResult::Executed { outcome } => {
                output.push_str(&format!(
                    "  {} {:<width$}  {:<11}  {} ms\n",
                    status_icon(outcome.status),
                    entry.unit_id,
                    outcome.status.label(),
                    outcome.duration_ms,
                    width = width
                ));
            }
        }
    }

    let s = &report.summary;
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "{} units: {} succeeded, {} failed, {} timed out, {} spawn errors, {} not found, {} skipped\n",
        s.total, s.succeeded, s.failed, s.timed_out, s.spawn_errors, s.not_found, s.skipped
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchEntry;
    use demorun_core::{ExecutionOutcome, UnitPattern};

    #[test]
    fn test_unit_list() {
        let pattern = UnitPattern::default();
        let units = vec![
            ExampleUnit::from_path("x/beeai_example.py", &pattern).unwrap(),
            ExampleUnit::from_path("x/watsonx_sdk_example.py", &pattern).unwrap(),
        ];
        let text = format_unit_list(&units);
        assert!(text.contains("Beeai        beeai_example.py"));
        assert!(text.contains("Watsonx Sdk  watsonx_sdk_example.py"));
        assert!(text.ends_with("2 examples found.\n"));
    }

    #[test]
    fn test_outcome_text() {
        let rendered = RenderedOutcome {
            unit_id: "beeai_example.py".to_string(),
            title: "Beeai".to_string(),
            status: ExecutionStatus::Failure,
            headline: "beeai_example.py encountered an error (return code 1).".to_string(),
            body: "Traceback".to_string(),
            exit_code: Some(1),
            duration_ms: 12,
        };
        let text = format_human_outcome(&rendered);
        assert!(text.starts_with("✗ Beeai - Output\n"));
        assert!(text.contains("status: ERROR  duration: 12 ms  exit code: 1"));
        assert!(text.ends_with("Traceback\n"));
    }

    #[test]
    fn test_batch_text() {
        let mut report = BatchReport::new("examples", 30_000);
        report.push(BatchEntry::skipped("u1_example.py", "file missing"));
        report.push(BatchEntry::executed(
            "u2_example.py",
            ".venv",
            ExecutionOutcome {
                status: ExecutionStatus::Success,
                stdout: "ok".to_string(),
                stderr: String::new(),
                exit_code: Some(0),
                duration_ms: 5,
                error: None,
            },
        ));
        let text = format_human_batch(&report);
        assert!(text.contains("⊘ u1_example.py"));
        assert!(text.contains("✓ u2_example.py"));
        assert!(text.contains("2 units: 1 succeeded, 0 failed, 0 timed out, 0 spawn errors, 0 not found, 1 skipped"));
    }
}
