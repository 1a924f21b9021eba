//! Paginated collection walker

use super::types::{AccumulatedCollection, Accumulator, CollectionResult, PaginationConfig};
use crate::envelope::EnvelopeUnwrapper;
use crate::error::Result;
use crate::http::TransportClient;
use crate::record::RecordNormalizer;
use crate::transport::{TransportPreference, TransportSelector};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Assembles a complete collection from a paginated remote method
#[derive(Debug)]
pub struct PaginationEngine<'a, C> {
    selector: &'a TransportSelector<C>,
    preference: &'a TransportPreference,
    config: PaginationConfig,
    unwrapper: EnvelopeUnwrapper,
    normalizer: RecordNormalizer,
}

impl<'a, C: TransportClient> PaginationEngine<'a, C> {
    /// Create an engine over `selector`, reading and updating `preference`
    pub fn new(
        selector: &'a TransportSelector<C>,
        preference: &'a TransportPreference,
        config: PaginationConfig,
    ) -> Self {
        Self {
            selector,
            preference,
            config,
            unwrapper: EnvelopeUnwrapper::new(),
            normalizer: RecordNormalizer::new(),
        }
    }

    /// Normalize pages with `normalizer` instead of the task normalizer
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: RecordNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Pagination settings in use
    pub fn config(&self) -> &PaginationConfig {
        &self.config
    }

    /// Fetch every page of `method`, substituting the cursor into
    /// `base_params`.
    ///
    /// Any page failure fails the whole fetch.
    pub async fn fetch_all(&self, method: &str, base_params: &Value) -> Result<AccumulatedCollection> {
        let mut acc = Accumulator::default();
        let mut cursor: Option<u64> = Some(0);

        while let Some(current) = cursor {
            if acc.visited.contains(&current) || acc.records.len() >= self.config.max_records {
                break;
            }
            acc.visited.insert(current);

            let params = with_cursor(base_params, &self.config.cursor_param, current);
            let body = self.selector.call(method, &params, self.preference).await?;
            let page = CollectionResult::from_envelope(self.unwrapper.unwrap(&body), &self.normalizer);

            debug!(
                "{} page at {}: {} records, total={:?}, next={:?}",
                method,
                current,
                page.records.len(),
                page.total,
                page.next_cursor
            );

            let empty = page.records.is_empty();
            // A stale or repeating cursor would otherwise loop forever.
            cursor = page.next_cursor.filter(|next| !acc.visited.contains(next));
            acc.absorb(page);

            if empty && cursor.is_none() {
                break;
            }
        }

        let collection = acc.finish();
        info!(
            "{} fetched {} records over {} pages (total {})",
            method,
            collection.records.len(),
            collection.visited_cursors.len(),
            collection.total
        );
        Ok(collection)
    }
}

/// Copy `base` with the cursor parameter set. Non-object bases start empty.
fn with_cursor(base: &Value, param: &str, cursor: u64) -> Value {
    let mut map = match base {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    map.insert(param.to_string(), Value::from(cursor));
    Value::Object(map)
}
