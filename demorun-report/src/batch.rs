//! Batch Report Data Structures

use chrono::{DateTime, Utc};
use demorun_core::{ExecutionOutcome, ExecutionStatus};
use serde::{Deserialize, Serialize};

/// Complete record of one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub meta: BatchMeta,
    pub entries: Vec<BatchEntry>,
    pub summary: BatchSummary,
}

/// Batch metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchMeta {
    pub version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub directory: String,
    pub timeout_ms: u64,
}

/// One unit's line in the batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEntry {
    pub unit_id: String,
    pub timestamp: DateTime<Utc>,
    pub environment: Option<String>,
    pub result: BatchEntryResult,
}

/// Whether a unit was run or skipped
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchEntryResult {
    /// File missing at batch time; not counted as a failure
    Skipped { reason: String },
    /// Unit was executed
    Executed { outcome: ExecutionOutcome },
}

/// Per-status counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub spawn_errors: usize,
    pub not_found: usize,
    pub skipped: usize,
    pub total_duration_ms: u64,
}

impl BatchReport {
    /// Start an empty report
    pub fn new(directory: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            meta: BatchMeta {
                version: env!("CARGO_PKG_VERSION").to_string(),
                started_at: Utc::now(),
                finished_at: None,
                directory: directory.into(),
                timeout_ms,
            },
            entries: Vec::new(),
            summary: BatchSummary::default(),
        }
    }

    /// Record an entry and update the summary
    pub fn push(&mut self, entry: BatchEntry) {
        let summary = &mut self.summary;
        summary.total += 1;
        match &entry.result {
            BatchEntryResult::Skipped { .. } => summary.skipped += 1,
            BatchEntryResult::Executed { outcome } => {
                summary.total_duration_ms += outcome.duration_ms;
                match outcome.status {
                    ExecutionStatus::Success => summary.succeeded += 1,
                    ExecutionStatus::Failure => summary.failed += 1,
                    ExecutionStatus::Timeout => summary.timed_out += 1,
                    ExecutionStatus::SpawnError => summary.spawn_errors += 1,
                    ExecutionStatus::NotFound => summary.not_found += 1,
                }
            }
        }
        self.entries.push(entry);
    }

    /// Stamp the finish time
    pub fn finish(&mut self) {
        self.meta.finished_at = Some(Utc::now());
    }

    /// Number of executed units that did not succeed
    pub fn unsuccessful(&self) -> usize {
        let s = &self.summary;
        s.failed + s.timed_out + s.spawn_errors + s.not_found
    }
}

impl BatchEntry {
    /// Entry for a unit whose file was missing
    pub fn skipped(unit_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            timestamp: Utc::now(),
            environment: None,
            result: BatchEntryResult::Skipped {
                reason: reason.into(),
            },
        }
    }

    /// Entry for an executed unit
    pub fn executed(
        unit_id: impl Into<String>,
        environment: impl Into<String>,
        outcome: ExecutionOutcome,
    ) -> Self {
        Self {
            unit_id: unit_id.into(),
            timestamp: Utc::now(),
            environment: Some(environment.into()),
            result: BatchEntryResult::Executed { outcome },
        }
    }

    /// Outcome when the unit was executed
    pub fn outcome(&self) -> Option<&ExecutionOutcome> {
        match &self.result {
            BatchEntryResult::Executed { outcome } => Some(outcome),
            BatchEntryResult::Skipped { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: ExecutionStatus, duration_ms: u64) -> ExecutionOutcome {
        ExecutionOutcome {
            status,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            duration_ms,
            error: None,
        }
    }

    #[test]
    fn test_summary_counts() {
        let mut report = BatchReport::new("examples", 30_000);
        report.push(BatchEntry::skipped("u1_example.py", "missing"));
        report.push(BatchEntry::executed(
            "u2_example.py",
            ".venv",
            outcome(ExecutionStatus::Success, 10),
        ));
        report.push(BatchEntry::executed(
            "u3_example.py",
            ".venv",
            outcome(ExecutionStatus::Timeout, 30_000),
        ));
        report.finish();

        assert_eq!(
            report.summary,
            BatchSummary {
                total: 3,
                succeeded: 1,
                failed: 0,
                timed_out: 1,
                spawn_errors: 0,
                not_found: 0,
                skipped: 1,
                total_duration_ms: 30_010,
            }
        );
        assert_eq!(report.unsuccessful(), 1);
        assert!(report.meta.finished_at.is_some());
        assert!(report.entries[0].outcome().is_none());
        assert!(report.entries[1].outcome().is_some());
    }
}
