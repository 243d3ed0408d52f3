#![warn(missing_docs)]
//! demorun Core - Discovery and Resolution
//!
//! This crate holds the pieces every front end shares:
//! - `ExampleUnit` and the `UnitPattern` naming convention
//! - Directory scanning (`list_units`, `find_unit`)
//! - Ordered keyword-to-environment resolution (`BindingTable`)
//! - Execution request/outcome types produced by the executor

mod outcome;
mod registry;
mod resolver;
mod unit;

pub use outcome::{ExecutionOutcome, ExecutionRequest, ExecutionStatus};
pub use registry::{RegistryError, filter_units, find_unit, list_units};
pub use resolver::{BindingRule, BindingTable};
pub use unit::{ExampleUnit, UnitPattern, display_name};

/// Timeout applied to a single execution when nothing else is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
