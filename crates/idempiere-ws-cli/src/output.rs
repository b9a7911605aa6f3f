//! Output formatting utilities

use crate::error::CliResult;
use colored::*;
use idempiere_ws_client::{InvocationResult, TruncationAdvisory};
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Print a single item in the specified format
pub fn print_single<T: Serialize>(data: &T, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Text | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(data)?);
        }
    }
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Outcome of one `run`, as printed with `--output json|yaml`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationReport {
    pub process: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<TruncationAdvisory>,
}

impl InvocationReport {
    pub fn new(
        process: &str,
        result: &InvocationResult,
        advisories: Vec<TruncationAdvisory>,
    ) -> Self {
        let mut report = Self {
            process: process.to_string(),
            ok: result.is_ok(),
            summary: None,
            kind: None,
            message: None,
            detail: None,
            advisories,
        };
        match result {
            Ok(summary) => report.summary = Some(summary.clone()),
            Err(error) => {
                report.kind = Some(error.kind().to_string());
                report.message = Some(error.to_string());
                report.detail = Some(error.detail());
            }
        }
        report
    }

    /// Text rendering: advisories as warnings, then `✓ summary` or `✗ kind: detail`
    pub fn print_text(&self) {
        for advisory in &self.advisories {
            print_warning(&advisory.to_string());
        }
        if let Some(summary) = &self.summary {
            print_success(summary);
        }
        if let (Some(kind), Some(detail)) = (&self.kind, &self.detail) {
            print_error(&format!("{}: {}", kind, detail));
        }
    }
}
