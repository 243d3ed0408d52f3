//! Example Dispatcher
//!
//! The operations both front ends are built on: list units, view one unit's
//! source, and execute one unit end to end (resolve → execute → render).
//!
//! A `Dispatcher` is read-only after construction. Cloning is cheap and every
//! call is self-contained, so concurrent triggers need no locking. Listings
//! are recomputed on every call.

use crate::config::DemorunConfig;
use demorun_core::{
    BindingTable, ExampleUnit, ExecutionOutcome, ExecutionRequest, RegistryError, UnitPattern,
    display_name, find_unit, list_units,
};
use demorun_exec::ProcessExecutor;
use demorun_report::{RenderedOutcome, render};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by the dispatcher; execution problems are outcomes, not errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Examples directory could not be listed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// No unit with this identifier in the listing
    #[error("File {0} not found.")]
    UnitNotFound(String),

    /// Unit source could not be read
    #[error("Failed to read {}: {source}", path.display())]
    ReadSource {
        /// Unit path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

/// A unit together with its source text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitSource {
    /// The unit
    pub unit: ExampleUnit,
    /// Environment root it resolves to
    pub environment: PathBuf,
    /// File contents
    pub source: String,
}

/// Shared entry point for the interactive and batch front ends
#[derive(Debug, Clone)]
pub struct Dispatcher {
    directory: PathBuf,
    pattern: UnitPattern,
    bindings: Arc<BindingTable>,
    executor: ProcessExecutor,
    timeout: Duration,
}

impl Dispatcher {
    /// Create a dispatcher from explicit parts
    pub fn new(
        directory: impl Into<PathBuf>,
        pattern: UnitPattern,
        bindings: BindingTable,
        executor: ProcessExecutor,
        timeout: Duration,
    ) -> Self {
        Self {
            directory: directory.into(),
            pattern,
            bindings: Arc::new(bindings),
            executor,
            timeout,
        }
    }

    /// Build a dispatcher from loaded configuration
    pub fn from_config(config: &DemorunConfig) -> anyhow::Result<Self> {
        let executor = ProcessExecutor::new(config.environments.interpreter.clone())
            .with_grace_period(config.grace_period()?);
        Ok(Self::new(
            config.registry.directory.clone(),
            config.unit_pattern(),
            config.binding_table(),
            executor,
            config.timeout()?,
        ))
    }

    /// Replace the per-execution timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Examples directory
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Per-execution timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Environment root `identifier` resolves to
    pub fn environment_for(&self, identifier: &str) -> &Path {
        self.bindings.resolve(identifier)
    }

    /// Executable that would run `identifier`
    pub fn executable_for(&self, identifier: &str) -> PathBuf {
        self.executor
            .executable_for(self.environment_for(identifier))
    }

    /// All units, sorted by file name
    pub fn list(&self) -> Result<Vec<ExampleUnit>, DispatchError> {
        Ok(list_units(&self.directory, &self.pattern)?)
    }

    /// Look up one unit
    pub fn find(&self, identifier: &str) -> Result<ExampleUnit, DispatchError> {
        find_unit(&self.directory, &self.pattern, identifier)?
            .ok_or_else(|| DispatchError::UnitNotFound(identifier.to_string()))
    }

    /// Unit for a file in the examples directory, matched or not
    pub fn unit_at(&self, identifier: &str) -> ExampleUnit {
        ExampleUnit {
            identifier: identifier.to_string(),
            path: self.directory.join(identifier),
            display_name: display_name(identifier, &self.pattern),
        }
    }

    /// Unit and its raw source text
    pub fn view(&self, identifier: &str) -> Result<UnitSource, DispatchError> {
        let unit = self.find(identifier)?;
        let source =
            std::fs::read_to_string(&unit.path).map_err(|source| DispatchError::ReadSource {
                path: unit.path.clone(),
                source,
            })?;
        Ok(UnitSource {
            environment: self.environment_for(&unit.identifier).to_path_buf(),
            unit,
            source,
        })
    }

    /// Request for `unit` with the configured timeout
    pub fn request(&self, unit: ExampleUnit) -> ExecutionRequest {
        ExecutionRequest::new(unit, self.timeout)
    }

    /// Execute a prepared request
    pub fn run_request(&self, request: &ExecutionRequest) -> ExecutionOutcome {
        self.executor.run(request, &self.bindings)
    }

    /// Execute one unit and render the result.
    ///
    /// Only a unit missing from the listing is an error; every execution
    /// problem comes back as a rendered outcome.
    pub fn execute(&self, identifier: &str) -> Result<RenderedOutcome, DispatchError> {
        let unit = self.find(identifier)?;
        tracing::info!(
            unit = %unit.identifier,
            "Running '{}' using interpreter: {}",
            unit.path.display(),
            self.executable_for(&unit.identifier).display()
        );
        let request = self.request(unit);
        let outcome = self.run_request(&request);
        tracing::info!(
            unit = %request.unit.identifier,
            status = %outcome.status,
            duration_ms = outcome.duration_ms,
            "Execution finished"
        );
        Ok(render(&outcome, &request.unit))
    }
}
