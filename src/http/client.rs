//! HTTP transport client
//!
//! Sends one remote call over the direct or proxy path and classifies the
//! result:
//! - send failures become `NetworkFailure`
//! - non-success statuses and `error` payloads become `RemoteRejection`
//! - unparseable success bodies become `MalformedBody`

use super::types::{Transport, TransportError};
use crate::error::{Error, Result};
use crate::params::encode_query;
use crate::types::{ensure_trailing_slash, method_url};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Performs a single call over a chosen transport.
///
/// Implementations must not touch shared state; transport preference lives
/// with the caller.
#[async_trait]
pub trait TransportClient: Send + Sync {
    /// Call `method` with `params` over `transport`, returning the parsed body
    async fn send(
        &self,
        transport: Transport,
        method: &str,
        params: &Value,
    ) -> std::result::Result<Value, TransportError>;
}

/// Configuration for the HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Remote base endpoint (webhook), with trailing slash
    pub webhook: String,
    /// Proxy endpoint, if one exists in this environment
    pub proxy_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            webhook: String::new(),
            proxy_url: None,
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("crm-bridge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpTransportConfig {
    /// Create a new config builder
    pub fn builder() -> HttpTransportConfigBuilder {
        HttpTransportConfigBuilder::default()
    }
}

/// Builder for HTTP transport config
#[derive(Default)]
pub struct HttpTransportConfigBuilder {
    config: HttpTransportConfig,
}

impl HttpTransportConfigBuilder {
    /// Set the webhook base URL
    pub fn webhook(mut self, url: impl Into<String>) -> Self {
        self.config.webhook = ensure_trailing_slash(&url.into());
        self
    }

    /// Set the proxy endpoint
    pub fn proxy_url(mut self, url: impl Into<String>) -> Self {
        self.config.proxy_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpTransportConfig {
        self.config
    }
}

/// reqwest-backed [`TransportClient`]
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Create a transport, validating the configured URLs
    pub fn with_config(config: HttpTransportConfig) -> Result<Self> {
        if config.webhook.is_empty() {
            return Err(Error::missing_field("webhook"));
        }
        url::Url::parse(&config.webhook)?;
        if let Some(proxy) = &config.proxy_url {
            url::Url::parse(proxy)?;
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Transport configuration
    pub fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    /// Full direct URL for `method` with `params` in the query string
    pub fn direct_url(&self, method: &str, params: &Value) -> String {
        let url = method_url(&self.config.webhook, method);
        let query = encode_query(params);
        if query.is_empty() {
            url
        } else {
            format!("{url}?{query}")
        }
    }

    fn apply_headers(&self, mut req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        req
    }

    async fn send_direct(
        &self,
        method: &str,
        params: &Value,
    ) -> std::result::Result<Value, TransportError> {
        const T: Transport = Transport::Direct;
        let url = self.direct_url(method, params);
        debug!("Direct call: GET {}", url);

        let response = self
            .apply_headers(self.client.get(&url))
            .send()
            .await
            .map_err(|e| TransportError::network(T, format!("direct request failed: {e}")))?;

        let status = response.status();
        let raw = read_body(T, response).await?;

        if !status.is_success() {
            let mut message = format!("HTTP {}", status.as_u16());
            if let Some(reason) = status.canonical_reason() {
                message.push(' ');
                message.push_str(reason);
            }
            if !raw.is_empty() {
                message.push_str(": ");
                message.push_str(&raw);
            }
            match status.as_u16() {
                403 => message.push_str(
                    " (access denied: check that the webhook is still valid and allows inbound calls)",
                ),
                401 => message.push_str(" (authorization required: issue a new webhook key)"),
                _ => {}
            }
            return Err(TransportError::rejected(T, status.as_u16(), message));
        }

        parse_success_body(T, status.as_u16(), &raw)
    }

    async fn send_proxy(
        &self,
        method: &str,
        params: &Value,
    ) -> std::result::Result<Value, TransportError> {
        const T: Transport = Transport::Proxy;
        let Some(proxy_url) = &self.config.proxy_url else {
            return Err(TransportError::network(T, "no proxy endpoint configured"));
        };
        debug!("Proxy call: POST {} ({})", proxy_url, method);

        let payload = json!({
            "webhook": self.config.webhook,
            "method": method,
            "params": params,
        });

        let response = self
            .apply_headers(self.client.post(proxy_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| TransportError::network(T, format!("proxy unreachable: {e}")))?;

        let status = response.status();
        let raw = read_body(T, response).await?;

        if !status.is_success() {
            let mut message = format!("proxy returned HTTP {}", status.as_u16());
            if let Some(reason) = status.canonical_reason() {
                message.push(' ');
                message.push_str(reason);
            }
            if !raw.is_empty() {
                let details = serde_json::from_str::<Value>(&raw)
                    .ok()
                    .and_then(|data| error_details(&data));
                message.push_str(": ");
                message.push_str(details.as_deref().unwrap_or(&raw));
            }
            return Err(TransportError::rejected(T, status.as_u16(), message));
        }

        parse_success_body(T, status.as_u16(), &raw)
    }
}

#[async_trait]
impl TransportClient for HttpTransport {
    async fn send(
        &self,
        transport: Transport,
        method: &str,
        params: &Value,
    ) -> std::result::Result<Value, TransportError> {
        match transport {
            Transport::Direct => self.send_direct(method, params).await,
            Transport::Proxy => self.send_proxy(method, params).await,
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

async fn read_body(
    transport: Transport,
    response: Response,
) -> std::result::Result<String, TransportError> {
    response
        .text()
        .await
        .map_err(|e| TransportError::malformed(transport, format!("failed to read body: {e}")))
}

/// Parse a success body; empty bodies are `{}`, `error` payloads are rejections
fn parse_success_body(
    transport: Transport,
    status: u16,
    raw: &str,
) -> std::result::Result<Value, TransportError> {
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }

    let data: Value = serde_json::from_str(raw).map_err(|e| {
        TransportError::malformed(transport, format!("response is not valid JSON: {e}"))
    })?;

    if has_app_error(&data) {
        let message = error_details(&data).unwrap_or_else(|| "remote returned an error".into());
        return Err(TransportError::rejected(transport, status, message));
    }

    Ok(data)
}

/// Whether a body carries a truthy `error` field
fn has_app_error(data: &Value) -> bool {
    match data.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// `error_description`, `error` or `message`, first non-empty string wins
fn error_details(data: &Value) -> Option<String> {
    ["error_description", "error", "message"]
        .iter()
        .filter_map(|key| data.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Null | Value::String(_) => None,
            other => Some(other.to_string()),
        })
}
