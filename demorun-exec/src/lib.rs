#![warn(missing_docs)]
//! demorun Exec - Isolated Script Execution
//!
//! Spawns an example under its environment's interpreter as a child process,
//! captures stdout/stderr, enforces a wall-clock timeout and classifies the
//! result into an `ExecutionOutcome`.
//!
//! Unix only: termination signals the child's process group through `libc`.

mod capture;
mod executor;
mod supervisor;

pub use capture::OutputCapture;
pub use executor::{DEFAULT_INTERPRETER, ProcessExecutor};
pub use supervisor::{ChildGuard, SupervisorError, WaitResult};
