//! In-memory multi-field keyword search.
//!
//! Documents go into a [`DocumentStore`], the store is moved into
//! [`Index::build`], and the resulting [`Index`] answers ranked queries.
//! There is no way to query without a built index and no way to mutate one.

pub mod config;
pub mod error;
pub mod index;
pub mod ranker;
pub mod store;
pub mod tokenizer;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use config::{Bm25Params, FieldBoosts, SearchConfig};
pub use error::{Result, SearchError};
pub use index::{FieldStats, Index, IndexStats, Posting, Schema};
pub use ranker::{ScoredResult, SearchRequest};
pub use store::{Document, DocumentStore, Record};
pub use tokenizer::{Tokenizer, TokenizerOptions};

pub type DocId = u32;

/// Searchable text fields. Every indexed field is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Content,
    Filename,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Content, Field::Filename];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Content => "content",
            Field::Filename => "filename",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "content" => Ok(Field::Content),
            "filename" => Ok(Field::Filename),
            other => Err(SearchError::UnknownField(other.to_string())),
        }
    }
}
