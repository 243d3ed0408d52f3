//! Environment Resolver
//!
//! Maps a unit identifier to the environment root it runs under. Rules are
//! evaluated top to bottom and the first keyword contained in the identifier
//! wins; overlapping keywords are therefore settled by table order, never by
//! match length. When no rule matches, the default root is returned.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single `keyword → environment root` rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRule {
    /// Substring looked for in the unit identifier
    pub keyword: String,
    /// Environment root used when the keyword matches
    pub root: PathBuf,
}

impl BindingRule {
    /// Create a rule
    pub fn new(keyword: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            keyword: keyword.into(),
            root: root.into(),
        }
    }
}

/// Ordered rule set with a default root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingTable {
    rules: Vec<BindingRule>,
    default_root: PathBuf,
}

impl BindingTable {
    /// Build a table. `rules` are consulted in the order given.
    pub fn new(rules: Vec<BindingRule>, default_root: impl Into<PathBuf>) -> Self {
        Self {
            rules,
            default_root: default_root.into(),
        }
    }

    /// Resolve `identifier` to its environment root
    pub fn resolve(&self, identifier: &str) -> &Path {
        self.rules
            .iter()
            .find(|rule| !rule.keyword.is_empty() && identifier.contains(rule.keyword.as_str()))
            .map(|rule| rule.root.as_path())
            .unwrap_or(self.default_root.as_path())
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[BindingRule] {
        &self.rules
    }

    /// Root used when no rule matches
    pub fn default_root(&self) -> &Path {
        &self.default_root
    }
}

impl Default for BindingTable {
    /// The framework environments shipped with the demo repository
    fn default() -> Self {
        Self::new(
            vec![
                BindingRule::new("beeai", ".venv_beeai"),
                BindingRule::new("langflow", ".venv_langflow"),
                BindingRule::new("watsonx_sdk", ".venv_watsonx_sdk"),
                BindingRule::new("langraph", ".venv_langraph"),
            ],
            ".venv",
        )
    }
}
