//! Shared output formatting utilities for CLI commands
//!
//! Reports are printed as JSON or YAML.

use anyhow::{Context, Result};
use serde::Serialize;
use std::str::FromStr;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            _ => anyhow::bail!("Unsupported output format: '{}'. Use 'json' or 'yaml'.", s),
        }
    }
}

/// Print data in the specified format
pub fn print_output<T: Serialize>(data: &T, format: &str) -> Result<()> {
    println!("{}", render(data, format.parse()?)?);
    Ok(())
}

/// Render data in the specified OutputFormat
pub fn render<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(data).context("Failed to serialize to JSON"),
        OutputFormat::Yaml => serde_yaml::to_string(data).context("Failed to serialize to YAML"),
    }
}
