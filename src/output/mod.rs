mod cli;
mod json;

pub use cli::print_cli_table;
pub use json::print_json;

use crate::model::ScanResult;
use anyhow::Result;

/// Output format for scan results
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

pub fn print_result(result: &ScanResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => print_cli_table(result),
        OutputFormat::Json => print_json(result),
    }
}

/// Format result to string for file output (tables are left uncolored)
pub fn format_result_to_string(result: &ScanResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(cli::render_cli_table(result, false)),
        OutputFormat::Json => json::render_json(result),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchResult, TargetReport};
    use std::str::FromStr;

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("table"), Ok(OutputFormat::Table));
        assert_eq!(OutputFormat::from_str("JSON"), Ok(OutputFormat::Json));
        assert!(OutputFormat::from_str("sarif").is_err());
    }

    #[test]
    fn test_format_result_to_string_json() {
        let result = ScanResult::new(vec![TargetReport::fingerprinted(
            "https://gitlab.example.com",
            MatchResult::default(),
        )]);

        let json = format_result_to_string(&result, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["targets"][0]["status"], "fingerprinted");
        assert!(value["scan_time"].is_string());
    }

    #[test]
    fn test_format_result_to_string_table() {
        let result = ScanResult::new(vec![TargetReport::unavailable(
            "https://gitlab.example.com",
            "Got HTTP 302 from https://gitlab.example.com",
        )]);

        let text = format_result_to_string(&result, OutputFormat::Table).unwrap();
        assert!(text.contains("Target: https://gitlab.example.com"));
        assert!(text.contains("Reason: Got HTTP 302"));
        assert!(!text.contains('\x1b'));
        assert!(serde_json::from_str::<serde_json::Value>(&text).is_err());
    }
}
