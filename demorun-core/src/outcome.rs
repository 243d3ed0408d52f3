//! Execution Requests and Outcomes

use crate::unit::ExampleUnit;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One execution attempt, built per trigger and consumed synchronously
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Unit to run
    pub unit: ExampleUnit,
    /// Wall-clock bound for the child process
    pub timeout: Duration,
}

impl ExecutionRequest {
    /// Create a request
    pub fn new(unit: ExampleUnit, timeout: Duration) -> Self {
        Self { unit, timeout }
    }
}

/// Terminal classification of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Exited with code 0
    Success,
    /// Exited with a nonzero code or was killed by a signal
    Failure,
    /// Still running at the deadline and terminated
    Timeout,
    /// Environment executable missing or the spawn call failed
    SpawnError,
    /// Script file missing, nothing spawned
    NotFound,
}

impl ExecutionStatus {
    /// Whether this status counts as a successful run
    pub fn is_success(self) -> bool {
        matches!(self, ExecutionStatus::Success)
    }

    /// Upper-case label used in logs and terminal output
    pub fn label(self) -> &'static str {
        match self {
            ExecutionStatus::Success => "SUCCESS",
            ExecutionStatus::Failure => "ERROR",
            ExecutionStatus::Timeout => "TIMEOUT",
            ExecutionStatus::SpawnError => "SPAWN ERROR",
            ExecutionStatus::NotFound => "NOT FOUND",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one execution; exactly one is produced per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Classification
    pub status: ExecutionStatus,
    /// Captured standard output (partial on timeout)
    pub stdout: String,
    /// Captured standard error (partial on timeout)
    pub stderr: String,
    /// Exit code when the child exited normally
    pub exit_code: Option<i32>,
    /// Wall-clock time from spawn to resolution
    pub duration_ms: u64,
    /// Spawn or lookup error detail
    pub error: Option<String>,
}

impl ExecutionOutcome {
    /// Script file was missing
    pub fn not_found(detail: impl Into<String>, duration: Duration) -> Self {
        Self::errored(ExecutionStatus::NotFound, detail.into(), duration)
    }

    /// Environment executable unusable or spawn failed
    pub fn spawn_error(detail: impl Into<String>, duration: Duration) -> Self {
        Self::errored(ExecutionStatus::SpawnError, detail.into(), duration)
    }

    fn errored(status: ExecutionStatus, detail: String, duration: Duration) -> Self {
        Self {
            status,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            duration_ms: duration.as_millis() as u64,
            error: Some(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(ExecutionStatus::Success.to_string(), "SUCCESS");
        assert_eq!(ExecutionStatus::Timeout.label(), "TIMEOUT");
        assert!(ExecutionStatus::Success.is_success());
        assert!(!ExecutionStatus::Failure.is_success());
    }

    #[test]
    fn test_errored_outcomes() {
        let outcome = ExecutionOutcome::spawn_error("permission denied", Duration::from_millis(3));
        assert_eq!(outcome.status, ExecutionStatus::SpawnError);
        assert_eq!(outcome.error.as_deref(), Some("permission denied"));
        assert_eq!(outcome.duration_ms, 3);
        assert!(outcome.exit_code.is_none());

        let outcome = ExecutionOutcome::not_found("missing", Duration::ZERO);
        assert_eq!(outcome.status, ExecutionStatus::NotFound);
        assert!(!outcome.status.is_success());
    }
}
