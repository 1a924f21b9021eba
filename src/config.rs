//! Configuration types
//!
//! Settings for the remote endpoint, proxy availability, identity mapping
//! and demo data, loaded from YAML with environment overrides.
//!
//! ```yaml
//! webhook: https://example.bitrix24.kz/rest/13/secret/
//! proxy:
//!   url: https://app.example.com/server/bitrix
//! user_mapping:
//!   "721249582": "13"
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::http::HttpTransportConfig;
use crate::pagination::PaginationConfig;
use crate::types::ensure_trailing_slash;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Environment variable overriding the webhook
pub const ENV_WEBHOOK: &str = "CRM_WEBHOOK";
/// Environment variable overriding the proxy URL
pub const ENV_PROXY_URL: &str = "CRM_PROXY_URL";
/// Environment variable toggling demo mode
pub const ENV_DEMO: &str = "CRM_DEMO";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Remote base endpoint (incoming webhook URL)
    #[serde(default)]
    pub webhook: Option<String>,

    /// Server-side proxy settings
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// External identity -> remote user id
    #[serde(default)]
    pub user_mapping: HashMap<String, String>,

    /// Serve `demo_tasks` instead of calling the remote
    #[serde(default)]
    pub demo_mode: bool,

    /// Raw task items used in demo mode
    #[serde(default)]
    pub demo_tasks: Vec<Value>,

    /// HTTP settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
}

/// Proxy transport settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy endpoint URL
    #[serde(default)]
    pub url: Option<String>,

    /// Whether this environment may use the proxy at all
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: None,
            enabled: true,
        }
    }
}

/// HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Optional user agent override
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

impl ClientConfig {
    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Parse from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(content)?;
        config.normalize();
        Ok(config)
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable source
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(webhook) = lookup(ENV_WEBHOOK).filter(|v| !v.trim().is_empty()) {
            self.webhook = Some(webhook);
        }
        if let Some(proxy) = lookup(ENV_PROXY_URL).filter(|v| !v.trim().is_empty()) {
            self.proxy.url = Some(proxy.trim().to_string());
        }
        if let Some(demo) = lookup(ENV_DEMO) {
            self.demo_mode = parse_bool_flag(&demo);
        }
        self.normalize();
        self
    }

    fn normalize(&mut self) {
        self.webhook = self
            .webhook
            .as_deref()
            .map(ensure_trailing_slash)
            .filter(|w| !w.is_empty());
    }

    /// Webhook URL, or a configuration error when unset
    pub fn require_webhook(&self) -> Result<&str> {
        self.webhook
            .as_deref()
            .ok_or_else(|| Error::missing_field("webhook"))
    }

    /// Whether the proxy transport can be used in this environment
    pub fn supports_proxy(&self) -> bool {
        self.proxy.enabled && self.proxy.url.is_some()
    }

    /// Map an external identity to a remote user id
    pub fn resolve_user_id(&self, external_id: &str) -> Option<&str> {
        self.user_mapping
            .get(external_id.trim())
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    /// Build transport settings. Fails when no webhook is configured.
    pub fn transport_config(&self) -> Result<HttpTransportConfig> {
        let mut builder = HttpTransportConfig::builder()
            .webhook(self.require_webhook()?)
            .timeout(Duration::from_secs(self.http.timeout_secs));
        if self.proxy.enabled {
            if let Some(url) = &self.proxy.url {
                builder = builder.proxy_url(url.clone());
            }
        }
        if let Some(agent) = &self.http.user_agent {
            builder = builder.user_agent(agent.clone());
        }
        Ok(builder.build())
    }
}

/// Parse a boolean switch: empty means on; `0/false/no/off` mean off
pub fn parse_bool_flag(value: &str) -> bool {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return true;
    }
    !matches!(normalized.as_str(), "0" | "false" | "no" | "off")
}
