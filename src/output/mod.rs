mod cli;
mod json;
mod report;

pub use cli::{print_analyze_table, print_remotes_table};
pub use json::print_json;
pub use report::{ReportWriter, ANALYZE_DIR, REMOTES_DIR, REMOTES_FILE};

use crate::model::{AnalyzeResult, RemotesResult};
use anyhow::Result;

/// Output format for the summary printed to stdout
///
/// Report files are always JSON; this only affects what the terminal shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use 'table' or 'json'", s)),
        }
    }
}

pub fn print_analyze_result(result: &AnalyzeResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_analyze_table(result),
        OutputFormat::Json => print_json(result),
    }
}

pub fn print_remotes_result(result: &RemotesResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_remotes_table(result),
        OutputFormat::Json => print_json(result),
    }
}
