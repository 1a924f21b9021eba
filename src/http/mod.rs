//! HTTP transport module
//!
//! Performs one remote call over either transport and classifies the
//! outcome.
//!
//! # Transports
//!
//! - **Direct**: `GET <webhook><method>.json?<query>` straight to the remote
//! - **Proxy**: `POST <proxy_url>` with `{webhook, method, params}`; the
//!   proxy forwards the call server-side
//!
//! # Outcomes
//!
//! Every failure is one of [`TransportError`]'s three variants. Only
//! `NetworkFailure` means the host could not be reached.

mod client;
mod types;

pub use client::{HttpTransport, HttpTransportConfig, HttpTransportConfigBuilder, TransportClient};
pub use types::{Transport, TransportError};

#[cfg(test)]
mod tests;
