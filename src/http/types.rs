//! Transport identifiers and call outcomes

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The two request paths to the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Straight to the remote host
    Direct,
    /// Through the server-side proxy
    Proxy,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Direct => f.write_str("direct"),
            Transport::Proxy => f.write_str("proxy"),
        }
    }
}

/// Failure of a single transport call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The host could not be reached at all (DNS, TLS, connection refused)
    #[error("{transport} transport unreachable: {message}")]
    NetworkFailure { transport: Transport, message: String },

    /// The call completed but the remote refused it
    #[error("{transport} transport rejected (HTTP {status}): {message}")]
    RemoteRejection {
        transport: Transport,
        status: u16,
        message: String,
    },

    /// The call completed with success status but the body did not parse
    #[error("{transport} transport returned malformed body: {message}")]
    MalformedBody { transport: Transport, message: String },
}

impl TransportError {
    /// Create a network failure
    pub fn network(transport: Transport, message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            transport,
            message: message.into(),
        }
    }

    /// Create a remote rejection
    pub fn rejected(transport: Transport, status: u16, message: impl Into<String>) -> Self {
        Self::RemoteRejection {
            transport,
            status,
            message: message.into(),
        }
    }

    /// Create a malformed body error
    pub fn malformed(transport: Transport, message: impl Into<String>) -> Self {
        Self::MalformedBody {
            transport,
            message: message.into(),
        }
    }

    /// Transport the failure happened on
    pub fn transport(&self) -> Transport {
        match self {
            Self::NetworkFailure { transport, .. }
            | Self::RemoteRejection { transport, .. }
            | Self::MalformedBody { transport, .. } => *transport,
        }
    }

    /// Human-readable detail without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            Self::NetworkFailure { message, .. }
            | Self::RemoteRejection { message, .. }
            | Self::MalformedBody { message, .. } => message,
        }
    }

    /// True when the host was unreachable
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::NetworkFailure { .. })
    }

    /// Same failure with `suffix` appended to its message
    #[must_use]
    pub fn with_suffix(self, suffix: &str) -> Self {
        match self {
            Self::NetworkFailure { transport, message } => Self::NetworkFailure {
                transport,
                message: format!("{message}{suffix}"),
            },
            Self::RemoteRejection {
                transport,
                status,
                message,
            } => Self::RemoteRejection {
                transport,
                status,
                message: format!("{message}{suffix}"),
            },
            Self::MalformedBody { transport, message } => Self::MalformedBody {
                transport,
                message: format!("{message}{suffix}"),
            },
        }
    }
}
