//! CLI configuration

use crate::error::{CliError, CliResult};
use idempiere_ws_client::ClientConfig;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

const REDACTED: &str = "********";

/// CLI configuration
///
/// ```toml
/// [client]
/// server = "https://erp.example.com"
/// timeout_secs = 30
///
/// [context]
/// username = "SuperUser"
/// ad_client_id = 11
/// ad_org_id = 0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Server and transport settings
    #[serde(default)]
    pub client: ClientConfig,

    /// User context table, validated when a request is built
    #[serde(default)]
    pub context: Option<Value>,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig = toml::from_str(&contents)
                .map_err(|e| CliError::Config(format!("{}: {}", config_path.display(), e)))?;
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::Config("Cannot find config directory".into()))?;
        Ok(config_dir.join("idempiere-ws").join("config.toml"))
    }

    /// Apply command-line and environment overrides
    pub fn with_overrides(
        mut self,
        server: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        if let Some(server) = server {
            self.client.server = server;
        }

        let credentials = [("username", username), ("password", password)];
        if credentials.iter().any(|(_, value)| value.is_some()) {
            let mut context = match self.context.take() {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            };
            for (key, value) in credentials {
                if let Some(value) = value {
                    context.insert(key.to_string(), Value::String(value));
                }
            }
            self.context = Some(Value::Object(context));
        }

        self
    }

    /// Context as handed to validation; absent tables stay `null`
    pub fn context_value(&self) -> Value {
        self.context.clone().unwrap_or(Value::Null)
    }

    /// Copy safe to print
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(Value::Object(map)) = config.context.as_mut() {
            if let Some(password) = map.get_mut("password") {
                *password = Value::String(REDACTED.to_string());
            }
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.client.server, "http://localhost:8080");
        assert!(config.context.is_none());
    }

    #[test]
    fn test_load_missing_config() {
        // Should return default config when file doesn't exist
        let config = CliConfig::load(Some("/nonexistent/path/config.toml")).unwrap();
        assert!(config.context.is_none());
    }

    #[test]
    fn test_parse_tables() {
        let config: CliConfig = toml::from_str(
            r#"
            [client]
            server = "https://erp.example.com"

            [context]
            username = "SuperUser"
            password = "System"
            ad_client_id = 11
            ad_org_id = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.client.server, "https://erp.example.com");
        assert_eq!(config.client.timeout_secs, 30);
        let context = config.context.unwrap();
        assert_eq!(context["ad_client_id"], 11);
        assert_eq!(context["username"], "SuperUser");
    }

    #[test]
    fn test_overrides_fill_credentials() {
        let config = CliConfig::default().with_overrides(
            Some("http://erp:8080".into()),
            Some("admin".into()),
            None,
        );
        assert_eq!(config.client.server, "http://erp:8080");
        assert_eq!(config.context_value()["username"], "admin");
        assert!(config.context_value().get("password").is_none());
    }

    #[test]
    fn test_no_overrides_keep_missing_context() {
        let config = CliConfig::default().with_overrides(None, None, None);
        assert_eq!(config.context_value(), Value::Null);
    }

    #[test]
    fn test_redacted_masks_password() {
        let config = CliConfig::default().with_overrides(None, Some("u".into()), Some("secret".into()));
        let shown = serde_json::to_string(&config.redacted()).unwrap();
        assert!(!shown.contains("secret"));
        assert!(shown.contains(REDACTED));
    }
}
