//! Pagination types
//!
//! Per-page results and the accumulated collection built across pages.

use crate::envelope::Envelope;
use crate::record::{CanonicalRecord, RecordNormalizer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Query parameter carrying the page offset
pub const DEFAULT_CURSOR_PARAM: &str = "start";

/// Hard cap on records gathered by one fetch
pub const DEFAULT_MAX_RECORDS: usize = 2000;

/// Configuration for pagination behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Parameter the cursor is substituted into
    #[serde(default = "default_cursor_param")]
    pub cursor_param: String,
    /// Stop once this many records are accumulated
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

fn default_cursor_param() -> String {
    DEFAULT_CURSOR_PARAM.to_string()
}

fn default_max_records() -> usize {
    DEFAULT_MAX_RECORDS
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            cursor_param: default_cursor_param(),
            max_records: DEFAULT_MAX_RECORDS,
        }
    }
}

impl PaginationConfig {
    /// Override the cursor parameter name
    #[must_use]
    pub fn cursor_param(mut self, name: impl Into<String>) -> Self {
        self.cursor_param = name.into();
        self
    }

    /// Override the record cap
    #[must_use]
    pub fn max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }
}

/// One page, normalized
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionResult {
    /// Normalized records in response order
    pub records: Vec<CanonicalRecord>,
    /// Reported collection size
    pub total: Option<u64>,
    /// Offset of the next page
    pub next_cursor: Option<u64>,
}

impl CollectionResult {
    /// Normalize the items of an unwrapped envelope
    pub fn from_envelope(envelope: Envelope, normalizer: &RecordNormalizer) -> Self {
        Self {
            records: normalizer.normalize_all(&envelope.items),
            total: envelope.total,
            next_cursor: envelope.next_cursor,
        }
    }
}

/// Everything one `fetch_all` gathered.
///
/// `total` is final here: the largest reported total, or the record count
/// when nothing was reported or the report was smaller than what arrived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulatedCollection {
    /// Records in fetch order
    pub records: Vec<CanonicalRecord>,
    /// Collection size estimate
    pub total: u64,
    /// Cursors requested during the walk
    pub visited_cursors: BTreeSet<u64>,
    /// When the fetch completed
    pub loaded_at: DateTime<Utc>,
}

impl AccumulatedCollection {
    /// Build a collection from records gathered without paging
    pub fn from_records(records: Vec<CanonicalRecord>) -> Self {
        let total = records.len() as u64;
        Self {
            records,
            total,
            visited_cursors: BTreeSet::new(),
            loaded_at: Utc::now(),
        }
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records were gathered
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// In-flight accumulation state, owned by a single `fetch_all`
#[derive(Debug, Default)]
pub(crate) struct Accumulator {
    pub records: Vec<CanonicalRecord>,
    pub total: Option<u64>,
    pub visited: BTreeSet<u64>,
}

impl Accumulator {
    /// Fold a page into the running state
    pub fn absorb(&mut self, page: CollectionResult) {
        if let Some(reported) = page.total {
            self.total = Some(self.total.map_or(reported, |t| t.max(reported)));
        }
        self.records.extend(page.records);
    }

    /// Close out the walk and settle the final total
    pub fn finish(self) -> AccumulatedCollection {
        let count = self.records.len() as u64;
        let total = match self.total {
            Some(t) if t >= count => t,
            _ => count,
        };
        AccumulatedCollection {
            records: self.records,
            total,
            visited_cursors: self.visited,
            loaded_at: Utc::now(),
        }
    }
}
