use crate::config::Bm25Params;
use crate::store::{Document, DocumentStore};
use crate::tokenizer::{Tokenizer, TokenizerOptions};
use crate::{DocId, Field};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// What gets indexed: text fields (tokenized, scored) and keyword fields
/// (exact match, filter only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub text_fields: BTreeSet<Field>,
    pub keyword_fields: BTreeSet<String>,
    pub tokenizer: TokenizerOptions,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            text_fields: Field::ALL.into_iter().collect(),
            keyword_fields: BTreeSet::new(),
            tokenizer: TokenizerOptions::default(),
        }
    }
}

impl Schema {
    pub fn with_keyword_field(mut self, name: impl Into<String>) -> Self {
        self.keyword_fields.insert(name.into());
        self
    }

    pub fn with_tokenizer(mut self, tokenizer: TokenizerOptions) -> Self {
        self.tokenizer = tokenizer;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
}

/// Term statistics of one text field.
#[derive(Debug, Default)]
pub struct FieldStats {
    /// term -> postings sorted by doc_id; document frequency is the length.
    postings: HashMap<String, Vec<Posting>>,
    /// Token count per document, indexed by doc id.
    doc_lengths: Vec<u32>,
    total_tokens: u64,
    avg_len: f64,
}

impl FieldStats {
    fn build(docs: &[Document], field: Field, tokenizer: &Tokenizer) -> Self {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(docs.len());
        let mut total_tokens = 0u64;

        for doc in docs {
            let tokens = tokenizer.tokenize(doc.text(field));
            doc_lengths.push(tokens.len() as u32);
            total_tokens += tokens.len() as u64;

            let mut tf_counts: HashMap<String, u32> = HashMap::new();
            for term in tokens {
                *tf_counts.entry(term).or_insert(0) += 1;
            }
            // Documents are visited in id order, so every list stays sorted.
            for (term, tf) in tf_counts {
                postings.entry(term).or_default().push(Posting { doc_id: doc.id, tf });
            }
        }

        let avg_len = if docs.is_empty() { 0.0 } else { total_tokens as f64 / docs.len() as f64 };
        Self { postings, doc_lengths, total_tokens, avg_len }
    }

    pub fn postings(&self, term: &str) -> &[Posting] {
        self.postings.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn doc_freq(&self, term: &str) -> usize {
        self.postings(term).len()
    }

    pub fn doc_len(&self, doc_id: DocId) -> u32 {
        self.doc_lengths.get(doc_id as usize).copied().unwrap_or(0)
    }

    pub fn num_docs(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn avg_len(&self) -> f64 {
        self.avg_len
    }

    pub fn num_terms(&self) -> usize {
        self.postings.len()
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSummary {
    pub num_terms: usize,
    pub total_tokens: u64,
    pub avg_len: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub num_docs: usize,
    pub fields: BTreeMap<Field, FieldSummary>,
    pub keyword_fields: Vec<String>,
}

/// Immutable search index over a finalized [`DocumentStore`].
#[derive(Debug)]
pub struct Index {
    pub(crate) store: DocumentStore,
    pub(crate) schema: Schema,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) params: Bm25Params,
    pub(crate) fields: BTreeMap<Field, FieldStats>,
    /// keyword field -> value -> sorted doc ids
    pub(crate) keywords: HashMap<String, HashMap<String, Vec<DocId>>>,
}

impl Index {
    pub fn build(store: DocumentStore, schema: Schema) -> Self {
        Self::build_with(store, schema, Bm25Params::default())
    }

    /// One-shot indexing pass. Never fails: absent fields index as zero tokens.
    pub fn build_with(store: DocumentStore, schema: Schema, params: Bm25Params) -> Self {
        let tokenizer = Tokenizer::new(schema.tokenizer);
        let docs = store.all();
        let text_fields: Vec<Field> = schema.text_fields.iter().copied().collect();

        #[cfg(feature = "parallel")]
        let fields: BTreeMap<Field, FieldStats> = text_fields
            .par_iter()
            .map(|&field| (field, FieldStats::build(docs, field, &tokenizer)))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let fields: BTreeMap<Field, FieldStats> = text_fields
            .iter()
            .map(|&field| (field, FieldStats::build(docs, field, &tokenizer)))
            .collect();

        let mut keywords: HashMap<String, HashMap<String, Vec<DocId>>> = HashMap::new();
        for name in &schema.keyword_fields {
            let values = keywords.entry(name.clone()).or_default();
            for doc in docs {
                if let Some(value) = doc.keyword(name) {
                    values.entry(value.to_string()).or_default().push(doc.id);
                }
            }
        }

        tracing::info!(
            num_docs = docs.len(),
            content_terms = fields.get(&Field::Content).map(FieldStats::num_terms).unwrap_or(0),
            filename_terms = fields.get(&Field::Filename).map(FieldStats::num_terms).unwrap_or(0),
            keyword_fields = keywords.len(),
            "index built"
        );

        Self { store, schema, tokenizer, params, fields, keywords }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn params(&self) -> Bm25Params {
        self.params
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    pub fn field(&self, field: Field) -> Option<&FieldStats> {
        self.fields.get(&field)
    }

    pub fn documents(&self) -> &[Document] {
        self.store.all()
    }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.store.get(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn stats(&self) -> IndexStats {
        let fields = self
            .fields
            .iter()
            .map(|(field, stats)| {
                let summary = FieldSummary {
                    num_terms: stats.num_terms(),
                    total_tokens: stats.total_tokens(),
                    avg_len: stats.avg_len(),
                };
                (*field, summary)
            })
            .collect();
        IndexStats {
            num_docs: self.store.len(),
            fields,
            keyword_fields: self.schema.keyword_fields.iter().cloned().collect(),
        }
    }
}
