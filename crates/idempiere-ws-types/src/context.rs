//! Authenticated user context for a process invocation

use crate::error::{WsError, WsResult};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

const REDACTED: &str = "********";

/// Credentials and tenant identifiers sent in the `ADLoginRequest` block.
///
/// Construction validates every mandatory field, so a `UserContext` value
/// is always usable for building a request. The password never appears in
/// `Debug` output or in serialized form.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct UserContext {
    username: String,
    password: String,
    client_id: i64,
    role_id: Option<i64>,
    org_id: i64,
    warehouse_id: Option<i64>,
}

impl UserContext {
    /// Create a context from already-typed identifiers.
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        client_id: i64,
        org_id: i64,
    ) -> WsResult<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() {
            return Err(WsError::MissingCredential("username is empty".into()));
        }
        if password.is_empty() {
            return Err(WsError::MissingCredential("password is empty".into()));
        }

        Ok(Self {
            username,
            password,
            client_id,
            role_id: None,
            org_id,
            warehouse_id: None,
        })
    }

    pub fn with_role(mut self, role_id: i64) -> Self {
        self.role_id = Some(role_id);
        self
    }

    pub fn with_warehouse(mut self, warehouse_id: i64) -> Self {
        self.warehouse_id = Some(warehouse_id);
        self
    }

    /// Build a context from loosely-typed data such as a config table or a
    /// JSON payload.
    ///
    /// Accepts the ERP column names (`ad_client_id`, `ad_role_id`,
    /// `ad_org_id`, `m_warehouse_id`) and the short forms (`client_id`,
    /// `role_id`, `org_id`, `warehouse_id`). Identifiers go through strict
    /// integer coercion: integers, integral floats and strings holding an
    /// integer are accepted, anything else is rejected.
    pub fn from_value(value: &Value) -> WsResult<Self> {
        let map = match value {
            Value::Object(map) => map,
            Value::Null => return Err(WsError::InvalidContext("user context is missing".into())),
            other => {
                return Err(WsError::InvalidContext(format!(
                    "expected an object, found {}",
                    json_type(other)
                )))
            }
        };

        let username = credential(map, "username")?;
        let password = credential(map, "password")?;
        let client_id = required_id(map, &["ad_client_id", "client_id"])?;
        let org_id = required_id(map, &["ad_org_id", "org_id"])?;
        let role_id = optional_id(map, &["ad_role_id", "role_id"])?;
        let warehouse_id = optional_id(map, &["m_warehouse_id", "warehouse_id"])?;

        Ok(Self {
            username,
            password,
            client_id,
            role_id,
            org_id,
            warehouse_id,
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn client_id(&self) -> i64 {
        self.client_id
    }

    /// Role, when absent the server resolves the user's default role
    pub fn role_id(&self) -> Option<i64> {
        self.role_id
    }

    pub fn org_id(&self) -> i64 {
        self.org_id
    }

    pub fn warehouse_id(&self) -> Option<i64> {
        self.warehouse_id
    }

    /// Copy of this context with the password masked, for display purposes
    pub fn redacted(&self) -> Self {
        Self {
            password: REDACTED.to_string(),
            ..self.clone()
        }
    }
}

impl TryFrom<Value> for UserContext {
    type Error = WsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}

impl fmt::Debug for UserContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserContext")
            .field("username", &self.username)
            .field("password", &REDACTED)
            .field("client_id", &self.client_id)
            .field("role_id", &self.role_id)
            .field("org_id", &self.org_id)
            .field("warehouse_id", &self.warehouse_id)
            .finish()
    }
}

#[derive(Serialize)]
struct ContextView<'a> {
    username: &'a str,
    password: &'a str,
    client_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    role_id: Option<i64>,
    org_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse_id: Option<i64>,
}

impl Serialize for UserContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ContextView {
            username: &self.username,
            password: REDACTED,
            client_id: self.client_id,
            role_id: self.role_id,
            org_id: self.org_id,
            warehouse_id: self.warehouse_id,
        }
        .serialize(serializer)
    }
}

fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| map.get(*key))
        .find(|value| !value.is_null())
}

fn credential(map: &Map<String, Value>, key: &str) -> WsResult<String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(WsError::MissingCredential(format!("{} is empty", key))),
        None | Some(Value::Null) => Err(WsError::MissingCredential(format!("{} is missing", key))),
        Some(other) => Err(WsError::MissingCredential(format!(
            "{} must be a string, found {}",
            key,
            json_type(other)
        ))),
    }
}

fn required_id(map: &Map<String, Value>, keys: &[&str]) -> WsResult<i64> {
    let value = lookup(map, keys)
        .ok_or_else(|| WsError::MissingIdentifier(format!("{} is missing", keys[0])))?;
    coerce_integer(value).ok_or_else(|| {
        WsError::MissingIdentifier(format!("{} is not an integer: {}", keys[0], value))
    })
}

fn optional_id(map: &Map<String, Value>, keys: &[&str]) -> WsResult<Option<i64>> {
    match lookup(map, keys) {
        None => Ok(None),
        Some(value) => coerce_integer(value).map(Some).ok_or_else(|| {
            WsError::MissingIdentifier(format!("{} is not an integer: {}", keys[0], value))
        }),
    }
}

/// Strict integer conversion used for every numeric identifier.
pub(crate) fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64().and_then(|f| {
                let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
                (f.is_finite() && f.fract() == 0.0 && in_range).then_some(f as i64)
            })
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
