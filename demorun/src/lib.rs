#![warn(missing_docs)]
//! # demorun
//!
//! Discover example scripts in a directory and run each one with the
//! interpreter of the environment it is bound to.
//!
//! - **Registry**: units are files whose stem ends in a marker (`_example.py`)
//! - **Environment Bindings**: ordered `keyword → root` rules, first match wins
//! - **Time-Bounded Execution**: each run gets a timeout; overruns are
//!   terminated with their whole process group
//! - **Classified Outcomes**: success, failure, timeout, spawn error, not found
//! - **Two Front Ends**: interactive (CLI + HTTP API) and sequential batch
//!
//! ## Quick Start
//!
//! ```ignore
//! use demorun::prelude::*;
//!
//! let dispatcher = Dispatcher::from_config(&DemorunConfig::default())?;
//! for unit in dispatcher.list()? {
//!     let rendered = dispatcher.execute(&unit.identifier)?;
//!     println!("{}: {}", rendered.title, rendered.status);
//! }
//! ```

// Re-export core types
pub use demorun_core::{
    BindingRule, BindingTable, DEFAULT_TIMEOUT_SECS, ExampleUnit, ExecutionOutcome,
    ExecutionRequest, ExecutionStatus, RegistryError, UnitPattern, display_name, filter_units,
    find_unit, list_units,
};

// Re-export execution
pub use demorun_exec::{DEFAULT_INTERPRETER, ProcessExecutor};

// Re-export reporting
pub use demorun_report::{
    BatchEntry, BatchEntryResult, BatchReport, BatchSummary, OutputFormat, RenderedOutcome,
    TIMEOUT_MESSAGE, render,
};

// Re-export front ends
pub use demorun_cli::{
    CONFIG_FILE_NAME, DemorunConfig, DispatchError, Dispatcher, UnitSource, run_batch,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BindingTable, DemorunConfig, Dispatcher, ExecutionStatus, RenderedOutcome, run_batch,
    };
}

/// Run the demorun CLI.
///
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     demorun::run()
/// }
/// ```
pub use demorun_cli::run;
