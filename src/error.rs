//! Error types for crm-bridge
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use crate::http::{Transport, TransportError};
use thiserror::Error;

/// The main error type for crm-bridge
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("Network failure via {transport} transport: {message}")]
    NetworkFailure {
        transport: Transport,
        message: String,
    },

    #[error("Remote rejected request via {transport} transport (HTTP {status}): {message}")]
    RemoteRejection {
        transport: Transport,
        status: u16,
        message: String,
    },

    #[error("Malformed response body via {transport} transport: {message}")]
    MalformedBody {
        transport: Transport,
        message: String,
    },

    #[error("No usable transport: {message}")]
    ExhaustedWithoutTransport { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Coarse error classification exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Remote host could not be reached
    NetworkFailure,
    /// Remote reachable but refused the request
    RemoteRejection,
    /// Remote answered with an unparseable body
    MalformedBody,
    /// A required setting is missing or invalid
    Configuration,
    /// Direct transport failed and no proxy is available
    ExhaustedWithoutTransport,
    /// Anything else (I/O, local parsing)
    Other,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an exhausted-transport error
    pub fn exhausted(message: impl Into<String>) -> Self {
        Self::ExhaustedWithoutTransport {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NetworkFailure { .. } => ErrorKind::NetworkFailure,
            Error::RemoteRejection { .. } => ErrorKind::RemoteRejection,
            Error::MalformedBody { .. } => ErrorKind::MalformedBody,
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::YamlParse(_)
            | Error::InvalidUrl(_) => ErrorKind::Configuration,
            Error::ExhaustedWithoutTransport { .. } => ErrorKind::ExhaustedWithoutTransport,
            _ => ErrorKind::Other,
        }
    }

    /// Only a network failure can be recovered by switching transport
    pub fn is_network_failure(&self) -> bool {
        self.kind() == ErrorKind::NetworkFailure
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NetworkFailure { transport, message } => {
                Error::NetworkFailure { transport, message }
            }
            TransportError::RemoteRejection {
                transport,
                status,
                message,
            } => Error::RemoteRejection {
                transport,
                status,
                message,
            },
            TransportError::MalformedBody { transport, message } => {
                Error::MalformedBody { transport, message }
            }
        }
    }
}

/// Result type alias for crm-bridge
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("webhook");
        assert_eq!(err.to_string(), "Missing required config field: webhook");

        let err = Error::RemoteRejection {
            transport: Transport::Direct,
            status: 404,
            message: "Not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Remote rejected request via direct transport (HTTP 404): Not found"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::config("x").kind(), ErrorKind::Configuration);
        assert_eq!(Error::missing_field("x").kind(), ErrorKind::Configuration);
        assert_eq!(
            Error::exhausted("x").kind(),
            ErrorKind::ExhaustedWithoutTransport
        );
        assert_eq!(
            Error::MalformedBody {
                transport: Transport::Proxy,
                message: "bad".into()
            }
            .kind(),
            ErrorKind::MalformedBody
        );
        assert_eq!(Error::Other("x".into()).kind(), ErrorKind::Other);
    }

    #[test]
    fn test_from_transport_error_keeps_kind() {
        let err: Error = TransportError::NetworkFailure {
            transport: Transport::Direct,
            message: "connection refused".into(),
        }
        .into();
        assert!(err.is_network_failure());
        assert!(err.to_string().contains("connection refused"));

        let err: Error = TransportError::RemoteRejection {
            transport: Transport::Proxy,
            status: 403,
            message: "denied".into(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::RemoteRejection);
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
