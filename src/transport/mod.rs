//! Transport selection module
//!
//! Decides which transport each call uses and demotes from direct to proxy
//! after a network failure.
//!
//! # State machine
//!
//! ```text
//!            NetworkFailure on Direct
//!   Direct ───────────────────────────▶ Proxy   (one-way, process lifetime)
//!     │
//!     └── pinned when the environment has no proxy
//! ```
//!
//! The state is a [`TransportPreference`] owned by the caller and passed into
//! every call, so independent instances can coexist (one per test scenario,
//! one per session).

mod selector;

pub use selector::{decide_fallback, FallbackDecision, TransportPreference, TransportSelector};
