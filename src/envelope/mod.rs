//! Response envelope module
//!
//! Extracts the item list and pagination metadata from remote responses.
//!
//! # Overview
//!
//! Different remote methods place their payload and paging metadata in
//! different places. The unwrapper tries an ordered list of extractor
//! functions for each piece and takes the first match; candidates that do not
//! parse are skipped, never treated as errors.

mod extractors;
mod types;

pub use extractors::{
    bare_array, raw_result_array, raw_result_items, result_array, result_items, ItemExtractor,
    NumberLocator, ITEM_EXTRACTORS, ITEM_KEYS, NEXT_LOCATORS, TOTAL_LOCATORS,
};
pub use types::{ApiResponse, Envelope, EnvelopeUnwrapper};
