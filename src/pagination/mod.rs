//! Pagination module
//!
//! Walks an offset-cursor collection to completion.
//!
//! # Overview
//!
//! [`PaginationEngine::fetch_all`] starts at cursor `0`, calls the remote
//! through the transport selector, unwraps and normalizes each page, and
//! follows the reported `next` cursor. It stops when:
//!
//! - there is no next cursor, or the cursor was already visited
//! - the accumulated record count reached the cap
//! - a page came back empty with no next cursor
//!
//! A failure on any page fails the whole fetch; partial pages are dropped.

mod engine;
mod types;

pub use engine::PaginationEngine;
pub use types::{
    AccumulatedCollection, CollectionResult, PaginationConfig, DEFAULT_CURSOR_PARAM,
    DEFAULT_MAX_RECORDS,
};
