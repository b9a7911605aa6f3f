//! Client configuration

use crate::envelope::DEFAULT_LOCALE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for [`crate::ProcessClient`] and its HTTP transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server base URL, e.g. `https://erp.example.com:8443`
    #[serde(default = "default_server")]
    pub server: String,

    /// Request timeout in seconds, 0 disables the timeout
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Locale tag sent in the login block
    #[serde(default = "default_locale")]
    pub locale: String,

    /// Honour HTTP(S)_PROXY environment variables
    #[serde(default)]
    pub use_system_proxy: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            timeout_secs: default_timeout(),
            locale: default_locale(),
            use_system_proxy: false,
        }
    }
}

impl ClientConfig {
    pub fn for_server(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

// Default value helpers
fn default_server() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_locale() -> String {
    DEFAULT_LOCALE.to_string()
}
