//! Batch Runner
//!
//! Runs a fixed list of units one after another. Each unit's child process is
//! fully resolved (including timeout handling) before the next one starts, so
//! log lines stay in order and at most one example runs at a time.
//!
//! A unit whose file is missing is logged as a warning and skipped; it is not
//! an execution failure. Nothing aborts the batch.

use crate::dispatcher::Dispatcher;
use demorun_core::{ExampleUnit, ExecutionOutcome, ExecutionStatus};
use demorun_report::{BatchEntry, BatchReport};
use tracing::{error, info, warn};

/// Run `unit_ids` sequentially and collect a report
pub fn run_batch(dispatcher: &Dispatcher, unit_ids: &[String]) -> BatchReport {
    let mut report = BatchReport::new(
        dispatcher.directory().display().to_string(),
        dispatcher.timeout().as_millis() as u64,
    );

    for unit_id in unit_ids {
        let path = dispatcher.directory().join(unit_id);
        if !path.is_file() {
            warn!(
                "File '{}' does not exist in '{}'. Skipping.",
                unit_id,
                dispatcher.directory().display()
            );
            report.push(BatchEntry::skipped(
                unit_id.clone(),
                format!("File '{}' does not exist", path.display()),
            ));
            continue;
        }

        // Listed units need not follow the naming convention
        let unit = dispatcher.unit_at(unit_id);

        let environment = dispatcher.environment_for(unit_id).display().to_string();
        info!(
            "Running '{}' using interpreter: {}",
            unit.path.display(),
            dispatcher.executable_for(unit_id).display()
        );

        let request = dispatcher.request(unit);
        let outcome = dispatcher.run_request(&request);
        log_outcome(&request.unit, &outcome);

        report.push(BatchEntry::executed(unit_id.clone(), environment, outcome));
    }

    report.finish();
    info!(
        "Batch complete: {} succeeded, {} unsuccessful, {} skipped",
        report.summary.succeeded,
        report.unsuccessful(),
        report.summary.skipped
    );
    report
}

fn log_outcome(unit: &ExampleUnit, outcome: &ExecutionOutcome) {
    let path = unit.path.display();
    match outcome.status {
        ExecutionStatus::Success => {
            info!(duration_ms = outcome.duration_ms, "SUCCESS: '{}' executed successfully.", path);
            info!("Output:\n{}", outcome.stdout);
        }
        ExecutionStatus::Failure => {
            match outcome.exit_code {
                Some(code) => error!(
                    "ERROR: '{}' encountered an error (return code {}).",
                    path, code
                ),
                None => error!(
                    "ERROR: '{}' encountered an error ({}).",
                    path,
                    outcome.error.as_deref().unwrap_or("no exit code")
                ),
            }
            error!("Error output:\n{}", outcome.stderr);
        }
        ExecutionStatus::Timeout => {
            error!(
                duration_ms = outcome.duration_ms,
                "TIMEOUT: '{}' did not complete within the timeout period.", path
            );
            if !outcome.stdout.is_empty() {
                error!("Partial output:\n{}", outcome.stdout);
            }
            if !outcome.stderr.is_empty() {
                error!("Partial error output:\n{}", outcome.stderr);
            }
        }
        ExecutionStatus::SpawnError | ExecutionStatus::NotFound => {
            error!(
                "EXCEPTION: An error occurred while running '{}': {}",
                path,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
