#![warn(missing_docs)]
//! demorun Report - Outcome Rendering
//!
//! Renders execution outcomes for the interactive and batch front ends:
//! - `render` (pure classification → headline/body)
//! - JSON (machine-readable)
//! - Human (terminal text)

mod batch;
mod human;
mod json;
mod render;

pub use batch::{BatchEntry, BatchEntryResult, BatchMeta, BatchReport, BatchSummary};
pub use human::{format_human_batch, format_human_outcome, format_unit_list};
pub use json::{generate_json_outcome, generate_json_report};
pub use render::{RenderedOutcome, TIMEOUT_MESSAGE, render};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Human-readable terminal output
    #[default]
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Human));
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
