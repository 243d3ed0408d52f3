//! Outcome Rendering
//!
//! Turns a classified `ExecutionOutcome` into something a front end can show:
//! a status, a one-line headline and a body. Pure; no I/O.

use demorun_core::{ExampleUnit, ExecutionOutcome, ExecutionStatus};
use serde::{Deserialize, Serialize};

/// Headline shown for every timed-out execution
pub const TIMEOUT_MESSAGE: &str = "The example did not complete within the timeout period.";

/// Presentable view of one execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedOutcome {
    /// Unit identifier (file name)
    pub unit_id: String,
    /// Unit display name
    pub title: String,
    /// Classified status
    pub status: ExecutionStatus,
    /// One-line summary
    pub headline: String,
    /// Main text to display
    pub body: String,
    /// Exit code when available
    pub exit_code: Option<i32>,
    /// Wall-clock duration
    pub duration_ms: u64,
}

/// Render `outcome` for `unit`.
///
/// Success shows stdout, Failure shows stderr, Timeout shows the fixed message
/// with whatever output was captured, SpawnError and NotFound show the error.
pub fn render(outcome: &ExecutionOutcome, unit: &ExampleUnit) -> RenderedOutcome {
    let detail = || outcome.error.clone().unwrap_or_default();

    let (headline, body) = match outcome.status {
        ExecutionStatus::Success => (
            format!("{} executed successfully.", unit.identifier),
            outcome.stdout.clone(),
        ),
        ExecutionStatus::Failure => {
            let headline = match outcome.exit_code {
                Some(code) => format!(
                    "{} encountered an error (return code {}).",
                    unit.identifier, code
                ),
                None => format!("{} encountered an error ({}).", unit.identifier, detail()),
            };
            let body = if outcome.stderr.is_empty() {
                detail()
            } else {
                outcome.stderr.clone()
            };
            (headline, body)
        }
        ExecutionStatus::Timeout => (TIMEOUT_MESSAGE.to_string(), partial_output(outcome)),
        ExecutionStatus::SpawnError => (
            format!("Error running {}.", unit.identifier),
            format!("Error running the example: {}", detail()),
        ),
        ExecutionStatus::NotFound => (format!("File {} not found.", unit.identifier), detail()),
    };

    RenderedOutcome {
        unit_id: unit.identifier.clone(),
        title: unit.display_name.clone(),
        status: outcome.status,
        headline,
        body,
        exit_code: outcome.exit_code,
        duration_ms: outcome.duration_ms,
    }
}

fn partial_output(outcome: &ExecutionOutcome) -> String {
    let mut body = outcome.stdout.clone();
    if !outcome.stderr.is_empty() {
        if !body.is_empty() && !body.ends_with('\n') {
            body.push('\n');
        }
        body.push_str("--- stderr ---\n");
        body.push_str(&outcome.stderr);
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use demorun_core::UnitPattern;

    fn unit() -> ExampleUnit {
        ExampleUnit::from_path("examples/langchain_example.py", &UnitPattern::default()).unwrap()
    }

    fn outcome(status: ExecutionStatus) -> ExecutionOutcome {
        ExecutionOutcome {
            status,
            stdout: "out\n".to_string(),
            stderr: "err\n".to_string(),
            exit_code: None,
            duration_ms: 42,
            error: None,
        }
    }

    #[test]
    fn test_success_shows_stdout() {
        let mut o = outcome(ExecutionStatus::Success);
        o.exit_code = Some(0);
        let r = render(&o, &unit());
        assert_eq!(r.body, "out\n");
        assert_eq!(r.title, "Langchain");
        assert_eq!(r.unit_id, "langchain_example.py");
        assert_eq!(r.duration_ms, 42);
    }

    #[test]
    fn test_failure_shows_stderr() {
        let mut o = outcome(ExecutionStatus::Failure);
        o.exit_code = Some(2);
        let r = render(&o, &unit());
        assert_eq!(r.body, "err\n");
        assert!(r.headline.contains("return code 2"));
    }

    #[test]
    fn test_signal_failure_without_stderr_uses_detail() {
        let mut o = outcome(ExecutionStatus::Failure);
        o.stderr.clear();
        o.error = Some("Terminated by signal 9".to_string());
        let r = render(&o, &unit());
        assert_eq!(r.body, "Terminated by signal 9");
    }

    #[test]
    fn test_timeout_shows_message_and_partial_output() {
        let r = render(&outcome(ExecutionStatus::Timeout), &unit());
        assert_eq!(r.headline, TIMEOUT_MESSAGE);
        assert_eq!(r.body, "out\n--- stderr ---\nerr\n");
    }

    #[test]
    fn test_errors_show_detail() {
        let mut o = outcome(ExecutionStatus::SpawnError);
        o.error = Some("permission denied".to_string());
        let r = render(&o, &unit());
        assert_eq!(r.body, "Error running the example: permission denied");

        let mut o = outcome(ExecutionStatus::NotFound);
        o.error = Some("File examples/langchain_example.py not found.".to_string());
        let r = render(&o, &unit());
        assert_eq!(r.body, "File examples/langchain_example.py not found.");
        assert_eq!(r.status, ExecutionStatus::NotFound);
    }
}
