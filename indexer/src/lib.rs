//! Document acquisition and presentation around `mdsearch-core`.

pub mod loader;
pub mod report;

use mdsearch_core::{Index, Record, Schema, SearchConfig};

pub fn schema_from_config(config: &SearchConfig) -> Schema {
    Schema {
        keyword_fields: config.keyword_fields.clone(),
        tokenizer: config.tokenizer,
        ..Schema::default()
    }
}

/// Bulk-load `records` into a fresh store and index it once.
pub fn build_index(records: Vec<Record>, config: &SearchConfig) -> Index {
    let store = records.into_iter().collect();
    Index::build_with(store, schema_from_config(config), config.bm25)
}
