//! Parameter encoding module
//!
//! Flattens nested parameter trees into the bracketed wire format the remote
//! API expects (`filter[RESPONSIBLE_ID]=13&select[]=ID`).
//!
//! - [`encode_query`]: query string for direct GET calls
//! - [`encode_form`]: form body with indexed arrays, used by the proxy

mod encode;

pub use encode::{encode_form, encode_query, flatten, ArrayStyle};
