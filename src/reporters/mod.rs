//! Output reporters for validation results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with colors
//! - `json` - Machine-readable JSON (the response object as-is)
//! - `markdown` - GitHub-flavored Markdown for PR comments and CI summaries

mod json;
mod markdown;
mod text;

use crate::models::Finding;
use crate::pipeline::ValidationResponse;
use crate::tokens::TokenReport;
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

/// Render a validation response using an OutputFormat enum
pub fn report_with_format(response: &ValidationResponse, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(response),
        OutputFormat::Json => json::render(response),
        OutputFormat::Markdown => markdown::render(response),
    }
}

/// Render several responses. JSON output is an array in input order.
pub fn report_batch(responses: &[ValidationResponse], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::render_batch(responses),
        OutputFormat::Text => text::render_batch(responses),
        OutputFormat::Markdown => {
            let parts = responses
                .iter()
                .map(markdown::render)
                .collect::<Result<Vec<_>>>()?;
            Ok(parts.join("\n---\n\n"))
        }
    }
}

/// Render the token/cost breakdown of one package
pub fn tokens_report(package_name: &str, tokens: &TokenReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_tokens(package_name, tokens)),
        OutputFormat::Json => json::render_tokens(package_name, tokens),
        OutputFormat::Markdown => Ok(markdown::render_tokens(package_name, tokens)),
    }
}

/// Render a findings-only listing (security scan)
pub fn findings_report(package_name: &str, findings: &[Finding], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(text::render_findings(package_name, findings)),
        OutputFormat::Json => json::render_findings(package_name, findings),
        OutputFormat::Markdown => Ok(markdown::render_findings(package_name, findings)),
    }
}

/// Get the recommended file extension for a format
pub fn file_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Text => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
    }
}
