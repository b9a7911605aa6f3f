//! Process parameters

use crate::context::json_type;
use crate::error::{WsError, WsResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Width of the remote parameter value column
pub const MAX_PARAM_LENGTH: usize = 255;

/// Scalar value of a process parameter.
///
/// `Null` renders as an empty field; the protocol does not distinguish an
/// omitted value from an empty one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Textual form embedded in the request
    pub fn render(&self) -> String {
        match self {
            ParamValue::Null => String::new(),
            ParamValue::Bool(b) => b.to_string(),
            ParamValue::Integer(i) => i.to_string(),
            ParamValue::Float(f) => f.to_string(),
            ParamValue::Text(s) => s.clone(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    /// `None` for arrays and objects
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(ParamValue::Null),
            Value::Bool(b) => Some(ParamValue::Bool(*b)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => ParamValue::Integer(i),
                // u64 beyond i64 keeps its exact digits
                None if n.is_u64() => ParamValue::Text(n.to_string()),
                None => ParamValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            Value::String(s) => Some(ParamValue::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Integer(i64::from(value))
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl<T: Into<ParamValue>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ParamValue::Null, Into::into)
    }
}

/// One `field` entry of the `ParamValues` block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub column: String,
    #[serde(default, alias = "val")]
    pub value: ParamValue,
}

impl Parameter {
    pub fn new(column: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn rendered(&self) -> String {
        self.value.render()
    }

    /// Advisory when the rendered value exceeds the remote column width.
    pub fn truncation_advisory(&self) -> Option<TruncationAdvisory> {
        let length = self.rendered().chars().count();
        (length > MAX_PARAM_LENGTH).then(|| TruncationAdvisory {
            column: self.column.clone(),
            length,
            limit: MAX_PARAM_LENGTH,
        })
    }

    /// Parse a loosely-typed parameter list.
    ///
    /// Expects an array of objects, each with a non-empty string `column`
    /// and an optional scalar `val` (or `value`). Order is preserved.
    pub fn list_from_value(value: &Value) -> WsResult<Vec<Parameter>> {
        let entries = value.as_array().ok_or_else(|| {
            WsError::InvalidParameterList(format!("expected an array, found {}", json_type(value)))
        })?;

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| parameter_from_entry(index, entry))
            .collect()
    }
}

fn parameter_from_entry(index: usize, entry: &Value) -> WsResult<Parameter> {
    let map = entry.as_object().ok_or_else(|| {
        WsError::InvalidParameterList(format!(
            "entry {} must be an object, found {}",
            index,
            json_type(entry)
        ))
    })?;

    let column = match map.get("column") {
        Some(Value::String(column)) if !column.is_empty() => column.clone(),
        _ => {
            return Err(WsError::InvalidParameterList(format!(
                "entry {} has no column name",
                index
            )))
        }
    };

    let raw = map.get("val").or_else(|| map.get("value")).unwrap_or(&Value::Null);
    let value = ParamValue::from_json(raw).ok_or_else(|| {
        WsError::InvalidParameterList(format!(
            "entry {} ({}) value must be a scalar, found {}",
            index,
            column,
            json_type(raw)
        ))
    })?;

    Ok(Parameter { column, value })
}

/// Non-fatal warning: the remote side stores at most [`MAX_PARAM_LENGTH`]
/// characters and may cut the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationAdvisory {
    pub column: String,
    pub length: usize,
    pub limit: usize,
}

impl fmt::Display for TruncationAdvisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "possible data loss: parameter column={} has {} characters, max {}",
            self.column, self.length, self.limit
        )
    }
}
