//! Script Registry
//!
//! Scans an examples directory (non-recursively) and returns the units that
//! follow the naming convention.
//!
//! Ordering: units are sorted by file name so repeated listings of an unchanged
//! directory are identical. Nothing is cached; every call re-reads the directory.

use crate::unit::{ExampleUnit, UnitPattern};
use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by directory discovery
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Examples directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// List every unit in `directory` matching `pattern`, sorted by file name.
///
/// An existing directory without matching files yields an empty list.
pub fn list_units(
    directory: impl AsRef<Path>,
    pattern: &UnitPattern,
) -> Result<Vec<ExampleUnit>, RegistryError> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        return Err(RegistryError::DirectoryNotFound(directory.to_path_buf()));
    }

    let entries = std::fs::read_dir(directory).map_err(|source| RegistryError::Io {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut units = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| RegistryError::Io {
            path: directory.to_path_buf(),
            source,
        })?;

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::debug!("Skipping non UTF-8 entry in {}", directory.display());
            continue;
        };
        if !pattern.matches(&name) {
            continue;
        }

        // Follow symlinks: a link to a script is a script, a link to a directory is not
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        if let Some(unit) = ExampleUnit::from_path(path, pattern) {
            units.push(unit);
        }
    }

    units.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    Ok(units)
}

/// Look up a single unit by identifier with a fresh listing.
///
/// Identifiers that are not plain file names never match.
pub fn find_unit(
    directory: impl AsRef<Path>,
    pattern: &UnitPattern,
    identifier: &str,
) -> Result<Option<ExampleUnit>, RegistryError> {
    if !is_plain_file_name(identifier) {
        return Ok(None);
    }
    let units = list_units(directory, pattern)?;
    Ok(units.into_iter().find(|u| u.identifier == identifier))
}

/// Keep the units whose identifier matches `filter`, preserving order
pub fn filter_units(units: Vec<ExampleUnit>, filter: Option<&Regex>) -> Vec<ExampleUnit> {
    match filter {
        Some(re) => units
            .into_iter()
            .filter(|u| re.is_match(&u.identifier))
            .collect(),
        None => units,
    }
}

fn is_plain_file_name(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier != "."
        && identifier != ".."
        && !identifier.contains(['/', '\\'])
}
