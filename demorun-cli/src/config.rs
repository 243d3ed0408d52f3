//! Configuration loading from demorun.toml
//!
//! demorun configuration can be specified in a `demorun.toml` file in the project root.
//! The configuration is discovered by walking up from the current directory.
//! Every field has a default matching the stock demo repository layout.

use anyhow::Context;
use demorun_core::{BindingRule, BindingTable, DEFAULT_TIMEOUT_SECS, UnitPattern};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked for during discovery
pub const CONFIG_FILE_NAME: &str = "demorun.toml";

/// demorun configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DemorunConfig {
    /// Example discovery
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Environment bindings
    #[serde(default)]
    pub environments: EnvironmentsConfig,
    /// Execution limits
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Batch unit list
    #[serde(default)]
    pub batch: BatchConfig,
    /// HTTP surface
    #[serde(default)]
    pub server: ServerConfig,
}

/// Where examples live and how they are named
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Examples directory
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// Suffix of the file stem (e.g. "_example")
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Required file extension; empty string accepts any
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            marker: default_marker(),
            extension: default_extension(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("examples")
}
fn default_marker() -> String {
    "_example".to_string()
}
fn default_extension() -> String {
    "py".to_string()
}

/// Ordered keyword rules plus default environment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentsConfig {
    /// Root used when no rule matches
    #[serde(default = "default_root")]
    pub default: PathBuf,
    /// Executable path relative to each root
    #[serde(default = "default_interpreter")]
    pub interpreter: PathBuf,
    /// Rules, evaluated in file order; first match wins
    #[serde(default = "default_rules", rename = "rule")]
    pub rules: Vec<BindingRule>,
}

impl Default for EnvironmentsConfig {
    fn default() -> Self {
        Self {
            default: default_root(),
            interpreter: default_interpreter(),
            rules: default_rules(),
        }
    }
}

fn default_root() -> PathBuf {
    BindingTable::default().default_root().to_path_buf()
}
fn default_interpreter() -> PathBuf {
    PathBuf::from(demorun_exec::DEFAULT_INTERPRETER)
}
fn default_rules() -> Vec<BindingRule> {
    BindingTable::default().rules().to_vec()
}

/// Execution limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Timeout for a single example (e.g., "30s", "2m")
    #[serde(default = "default_timeout")]
    pub timeout: String,
    /// Time between SIGTERM and SIGKILL for a timed-out example
    #[serde(default = "default_grace_period")]
    pub grace_period: String,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            grace_period: default_grace_period(),
        }
    }
}

fn default_timeout() -> String {
    format!("{}s", DEFAULT_TIMEOUT_SECS)
}
fn default_grace_period() -> String {
    "500ms".to_string()
}

/// Units run by `demorun batch`, in order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Unit identifiers (file names inside the examples directory)
    #[serde(default = "default_batch_units")]
    pub units: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            units: default_batch_units(),
        }
    }
}

fn default_batch_units() -> Vec<String> {
    [
        "beeai_example.py",
        "langchain_example.py",
        "langflow_example.py",
        "langraph_example.py",
        "watsonx_sdk_example.py",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// HTTP surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:5000".to_string()
}

impl DemorunConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("Invalid {}", path.display()))?;
        Ok(config)
    }

    /// Discover and load configuration by walking up from the current directory.
    ///
    /// Returns `Ok(None)` when no file exists; a file that fails to parse is an error.
    pub fn discover() -> anyhow::Result<Option<(PathBuf, Self)>> {
        let mut dir = std::env::current_dir()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                let config = Self::load(&config_path)?;
                return Ok(Some((config_path, config)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Resolve relative directories against `base` (the config file's directory)
    pub fn rebase(&mut self, base: &Path) {
        let join = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        join(&mut self.registry.directory);
        join(&mut self.environments.default);
        for rule in &mut self.environments.rules {
            join(&mut rule.root);
        }
    }

    /// Naming convention for units
    pub fn unit_pattern(&self) -> UnitPattern {
        let extension = self.registry.extension.trim();
        UnitPattern::new(
            self.registry.marker.clone(),
            (!extension.is_empty()).then_some(extension),
        )
    }

    /// Binding table in file order
    pub fn binding_table(&self) -> BindingTable {
        BindingTable::new(
            self.environments.rules.clone(),
            self.environments.default.clone(),
        )
    }

    /// Parsed per-example timeout
    pub fn timeout(&self) -> anyhow::Result<Duration> {
        Self::parse_duration(&self.runner.timeout)
            .with_context(|| format!("Invalid runner.timeout {:?}", self.runner.timeout))
    }

    /// Parsed SIGTERM → SIGKILL grace period
    pub fn grace_period(&self) -> anyhow::Result<Duration> {
        Self::parse_duration(&self.runner.grace_period).with_context(|| {
            format!("Invalid runner.grace_period {:?}", self.runner.grace_period)
        })
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# demorun configuration

[registry]
# Directory scanned for examples (non-recursive)
directory = "examples"
# File stems must end with this marker
marker = "_example"
# Required extension; "" accepts any
extension = "py"

[environments]
# Environment used when no rule matches
default = ".venv"
# Executable inside each environment root
interpreter = "bin/python"

# Rules are checked top to bottom; the first keyword found in the
# example's file name selects the environment.
[[environments.rule]]
keyword = "beeai"
root = ".venv_beeai"

[[environments.rule]]
keyword = "langflow"
root = ".venv_langflow"

[[environments.rule]]
keyword = "watsonx_sdk"
root = ".venv_watsonx_sdk"

[[environments.rule]]
keyword = "langraph"
root = ".venv_langraph"

[runner]
# Wall-clock limit for one example
timeout = "30s"
# Time between SIGTERM and SIGKILL once the limit is hit
grace_period = "500ms"

[batch]
# Examples run by `demorun batch`, in order
units = [
    "beeai_example.py",
    "langchain_example.py",
    "langflow_example.py",
    "langraph_example.py",
    "watsonx_sdk_example.py",
]

[server]
# Listen address for `demorun serve`
bind = "127.0.0.1:5000"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "30s", "500ms", "2m")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration number: {}", num_part));
        }

        let multiplier_ms: f64 = match unit_part.to_lowercase().as_str() {
            "ms" => 1.0,
            "s" | "" => 1_000.0,
            "m" | "min" => 60_000.0,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Duration::try_from_secs_f64(value * multiplier_ms / 1_000.0)
            .map_err(|e| anyhow::anyhow!("Duration out of range: {} ({})", s, e))
    }
}
