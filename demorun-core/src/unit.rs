//! Example Units
//!
//! An example unit is one runnable script in the examples directory. Units are
//! recognised by a naming convention: the file stem ends with a marker
//! (`_example` by default) and, optionally, the file carries a fixed extension.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One discoverable example script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleUnit {
    /// File name, unique within one discovery pass
    pub identifier: String,
    /// Full path to the script
    pub path: PathBuf,
    /// Human-readable title derived from the file name
    pub display_name: String,
}

impl ExampleUnit {
    /// Build a unit for `path` using `pattern` to derive the display name.
    ///
    /// Returns `None` when the path has no UTF-8 file name.
    pub fn from_path(path: impl Into<PathBuf>, pattern: &UnitPattern) -> Option<Self> {
        let path = path.into();
        let identifier = path.file_name()?.to_str()?.to_string();
        let display_name = display_name(&identifier, pattern);
        Some(Self {
            identifier,
            path,
            display_name,
        })
    }
}

/// Naming convention for example units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPattern {
    /// Suffix the file stem must end with
    pub marker: String,
    /// Required extension without the dot (`None` accepts any extension)
    pub extension: Option<String>,
}

impl Default for UnitPattern {
    fn default() -> Self {
        Self {
            marker: "_example".to_string(),
            extension: Some("py".to_string()),
        }
    }
}

impl UnitPattern {
    /// Create a pattern from a marker and optional extension
    pub fn new(marker: impl Into<String>, extension: Option<&str>) -> Self {
        Self {
            marker: marker.into(),
            extension: extension
                .map(|e| e.trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty()),
        }
    }

    /// Whether `file_name` follows the convention
    pub fn matches(&self, file_name: &str) -> bool {
        let (stem, ext) = split_name(file_name);
        if !stem.ends_with(&self.marker) {
            return false;
        }
        match &self.extension {
            Some(required) => ext == Some(required.as_str()),
            None => true,
        }
    }

    /// Strip the marker and extension from a matching file name
    pub fn strip<'a>(&self, file_name: &'a str) -> &'a str {
        let (stem, _) = split_name(file_name);
        stem.strip_suffix(self.marker.as_str()).unwrap_or(stem)
    }
}

/// Split `name` into stem and extension. Leading dots belong to the stem.
fn split_name(name: &str) -> (&str, Option<&str>) {
    match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(ext) => (&name[..name.len() - ext.len() - 1], Some(ext)),
        None => (name, None),
    }
}

/// Derive a title from a unit identifier.
///
/// `watsonx_sdk_example.py` becomes `Watsonx Sdk`: marker and extension are
/// stripped, `_`/`-` become spaces, and every word is title-cased.
pub fn display_name(identifier: &str, pattern: &UnitPattern) -> String {
    let title = pattern
        .strip(identifier)
        .split(['_', '-', ' '])
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ");
    // A file named after the bare marker has nothing left to title
    if title.is_empty() {
        identifier.to_string()
    } else {
        title
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pattern_matches_python_examples() {
        let pattern = UnitPattern::default();
        assert!(pattern.matches("beeai_example.py"));
        assert!(pattern.matches("watsonx_sdk_example.py"));
        assert!(!pattern.matches("beeai_example.txt"));
        assert!(!pattern.matches("example.py"));
        assert!(pattern.matches("_example.py"));
        assert_eq!(display_name("_example.py", &pattern), "_example.py");
        assert!(!pattern.matches("readme.txt"));
        assert!(!pattern.matches("example_beeai.py"));
    }

    #[test]
    fn test_any_extension() {
        let pattern = UnitPattern::new("_example", None);
        assert!(pattern.matches("a_example.x"));
        assert!(pattern.matches("b_example"));
        assert!(!pattern.matches("readme.txt"));
    }

    #[test]
    fn test_extension_leading_dot_is_ignored() {
        let pattern = UnitPattern::new("_example", Some(".x"));
        assert_eq!(pattern.extension.as_deref(), Some("x"));
        assert!(pattern.matches("a_example.x"));
    }

    #[test]
    fn test_display_name() {
        let pattern = UnitPattern::default();
        assert_eq!(display_name("watsonx_sdk_example.py", &pattern), "Watsonx Sdk");
        assert_eq!(display_name("beeai_example.py", &pattern), "Beeai");
        assert_eq!(display_name("LANGCHAIN-demo_example.py", &pattern), "Langchain Demo");
    }

    #[test]
    fn test_from_path() {
        let unit = ExampleUnit::from_path("examples/langraph_example.py", &UnitPattern::default())
            .unwrap();
        assert_eq!(unit.identifier, "langraph_example.py");
        assert_eq!(unit.display_name, "Langraph");
        assert_eq!(unit.path, PathBuf::from("examples/langraph_example.py"));
    }
}
