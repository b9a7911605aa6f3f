//! CLI command implementations

pub mod envelope;
pub mod run;

use crate::error::{CliError, CliResult};
use clap::Args;
use serde_json::{json, Value};
use std::path::PathBuf;

/// Process name and parameters shared by `run` and `envelope`
#[derive(Debug, Clone, Args)]
pub struct ProcessArgs {
    /// Process value (serviceType) configured on the server
    pub process: String,

    /// Parameter as column=value, repeatable
    #[arg(short = 'p', long = "param", value_parser = parse_param)]
    pub params: Vec<(String, String)>,

    /// JSON file holding a list of {"column": .., "val": ..} entries
    #[arg(long)]
    pub params_file: Option<PathBuf>,
}

impl ProcessArgs {
    /// Parameter list in loosely-typed form: file entries first, then `-p`
    /// flags in the order given.
    pub fn params_value(&self) -> CliResult<Value> {
        let mut entries = match &self.params_file {
            Some(path) => match serde_json::from_str(&std::fs::read_to_string(path)?)? {
                Value::Array(entries) => entries,
                _ => {
                    return Err(CliError::InvalidInput(format!(
                        "{} must hold a JSON array",
                        path.display()
                    )))
                }
            },
            None => Vec::new(),
        };

        entries.extend(
            self.params
                .iter()
                .map(|(column, value)| json!({"column": column, "val": value})),
        );
        Ok(Value::Array(entries))
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((column, value)) if !column.trim().is_empty() => {
            Ok((column.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected column=value, got '{}'", raw)),
    }
}
