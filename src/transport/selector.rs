//! Transport preference state and fallback orchestration

use crate::error::{Error, Result};
use crate::http::{Transport, TransportClient, TransportError};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, warn};

/// Which transport to use, shared by every fetch in a session.
///
/// `prefer_proxy` only ever flips from `false` to `true`, and only when the
/// environment supports a proxy. Concurrent demotions converge on the same
/// state.
#[derive(Debug)]
pub struct TransportPreference {
    prefer_proxy: AtomicBool,
    supports_proxy: bool,
}

impl TransportPreference {
    /// Start in `Direct`; `supports_proxy` decides whether demotion is possible
    pub fn new(supports_proxy: bool) -> Self {
        Self {
            prefer_proxy: AtomicBool::new(false),
            supports_proxy,
        }
    }

    /// A preference pinned to `Direct`
    pub fn direct_only() -> Self {
        Self::new(false)
    }

    /// Whether calls go to the proxy first
    pub fn prefer_proxy(&self) -> bool {
        self.prefer_proxy.load(Ordering::Acquire)
    }

    /// Whether this environment can reach the proxy at all
    pub fn supports_proxy(&self) -> bool {
        self.supports_proxy
    }

    /// Transport the next call starts on
    pub fn active(&self) -> Transport {
        if self.prefer_proxy() {
            Transport::Proxy
        } else {
            Transport::Direct
        }
    }

    /// Switch to `Proxy` for good. Returns true if this call made the switch.
    pub fn demote(&self) -> bool {
        if !self.supports_proxy {
            return false;
        }
        !self.prefer_proxy.swap(true, Ordering::AcqRel)
    }
}

impl Default for TransportPreference {
    fn default() -> Self {
        Self::new(true)
    }
}

/// What to do after a transport call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackDecision {
    /// Return the error as-is
    Surface,
    /// Demote and retry once over the proxy
    RetryViaProxy,
    /// Direct is unreachable and there is no proxy
    Exhausted,
}

/// Decide the follow-up for a failed call.
///
/// Only a direct-transport network failure is recoverable; rejections and
/// malformed bodies mean the remote was reached, so switching paths would
/// not help.
pub fn decide_fallback(error: &TransportError, supports_proxy: bool) -> FallbackDecision {
    if !error.is_network_failure() || error.transport() != Transport::Direct {
        FallbackDecision::Surface
    } else if supports_proxy {
        FallbackDecision::RetryViaProxy
    } else {
        FallbackDecision::Exhausted
    }
}

/// Runs calls over the preferred transport with one-shot proxy fallback
#[derive(Debug)]
pub struct TransportSelector<C> {
    client: C,
}

impl<C: TransportClient> TransportSelector<C> {
    /// Wrap a transport client
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The wrapped client
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Unwrap the client
    pub fn into_inner(self) -> C {
        self.client
    }

    /// Perform one call, honouring and updating `preference`
    pub async fn call(
        &self,
        method: &str,
        params: &Value,
        preference: &TransportPreference,
    ) -> Result<Value> {
        if preference.prefer_proxy() {
            return self
                .client
                .send(Transport::Proxy, method, params)
                .await
                .map_err(Error::from);
        }

        let direct_error = match self.client.send(Transport::Direct, method, params).await {
            Ok(body) => return Ok(body),
            Err(e) => e,
        };

        match decide_fallback(&direct_error, preference.supports_proxy()) {
            FallbackDecision::Surface => Err(direct_error.into()),
            FallbackDecision::Exhausted => Err(Error::exhausted(format!(
                "{direct_error}; proxy transport is not available in this environment"
            ))),
            FallbackDecision::RetryViaProxy => {
                if preference.demote() {
                    warn!(
                        "Direct transport unreachable, switching to proxy: {}",
                        direct_error.message()
                    );
                } else {
                    debug!("Direct transport unreachable, proxy already preferred");
                }
                self.client
                    .send(Transport::Proxy, method, params)
                    .await
                    .map_err(|proxy_error| {
                        proxy_error
                            .with_suffix(&format!(
                                " (direct transport also failed: {})",
                                direct_error.message()
                            ))
                            .into()
                    })
            }
        }
    }
}
