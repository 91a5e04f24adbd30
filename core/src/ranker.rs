//! Query-time ranking.
//!
//! Each indexed field is scored independently with BM25:
//!
//! ```text
//! idf(t)  = ln(1 + (N - df + 0.5) / (df + 0.5))
//! s_f(d)  = Σ idf(t) * tf * (k1 + 1) / (tf + k1 * (1 - b + b * |d|_f / avgdl_f))
//! score(d) = Σ_f boost(f) * s_f(d)
//! ```
//!
//! This idf never goes negative, so a larger boost can only raise a score.
//! Only documents sharing at least one query term are scored; ties are broken
//! by ascending doc id.

use crate::config::{Bm25Params, FieldBoosts};
use crate::error::{Result, SearchError};
use crate::index::{FieldStats, Index};
use crate::store::Document;
use crate::DocId;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

#[derive(Debug, Clone, Serialize)]
pub struct ScoredResult<'a> {
    pub document: &'a Document,
    pub score: f64,
    /// 1-based position in the result list.
    pub rank: usize,
}

/// A query with everything that shapes its result.
#[derive(Debug, Clone)]
pub struct SearchRequest<'q> {
    pub query: &'q str,
    pub k: usize,
    pub boosts: FieldBoosts,
    /// keyword field -> required exact value
    pub filters: BTreeMap<String, String>,
}

impl<'q> SearchRequest<'q> {
    pub fn new(query: &'q str) -> Self {
        Self { query, k: 5, boosts: FieldBoosts::default(), filters: BTreeMap::new() }
    }

    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn boosts(mut self, boosts: FieldBoosts) -> Self {
        self.boosts = boosts;
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }
}

fn idf(num_docs: usize, doc_freq: usize) -> f64 {
    let n = num_docs as f64;
    let df = doc_freq as f64;
    (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
}

fn term_weight(tf: u32, doc_len: u32, avg_len: f64, params: Bm25Params) -> f64 {
    let tf = tf as f64;
    let len_ratio = if avg_len > 0.0 { doc_len as f64 / avg_len } else { 0.0 };
    let norm = params.k1() * (1.0 - params.b() + params.b() * len_ratio);
    tf * (params.k1() + 1.0) / (tf + norm)
}

impl Index {
    /// Top `k` documents for `query`, weighting each field by `boosts`.
    pub fn search(&self, query: &str, k: usize, boosts: &FieldBoosts) -> Result<Vec<ScoredResult<'_>>> {
        let request = SearchRequest { query, k, boosts: boosts.clone(), filters: BTreeMap::new() };
        self.search_request(&request)
    }

    pub fn search_request(&self, request: &SearchRequest<'_>) -> Result<Vec<ScoredResult<'_>>> {
        if request.k == 0 {
            return Err(SearchError::InvalidResultCount(request.k));
        }
        let allowed = self.filter_set(&request.filters)?;

        // Sorted, de-duplicated terms keep score accumulation order fixed.
        let terms: BTreeSet<String> = self.tokenizer.tokenize(request.query).into_iter().collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut scores: HashMap<DocId, f64> = HashMap::new();
        for (field, stats) in &self.fields {
            let boost = request.boosts.get(*field);
            self.score_field(stats, &terms, boost, allowed.as_ref(), &mut scores);
        }
        let candidates = scores.len();

        let mut scored: Vec<(DocId, f64)> = scores.into_iter().collect();
        scored.sort_by(|a, b| match b.1.total_cmp(&a.1) {
            Ordering::Equal => a.0.cmp(&b.0),
            other => other,
        });
        scored.truncate(request.k);

        let results: Vec<ScoredResult<'_>> = scored
            .into_iter()
            .enumerate()
            .filter_map(|(i, (doc_id, score))| {
                self.store.get(doc_id).map(|document| ScoredResult { document, score, rank: i + 1 })
            })
            .collect();

        tracing::debug!(
            query = request.query,
            num_terms = terms.len(),
            candidates,
            returned = results.len(),
            "search"
        );
        Ok(results)
    }

    fn score_field(
        &self,
        stats: &FieldStats,
        terms: &BTreeSet<String>,
        boost: f64,
        allowed: Option<&HashSet<DocId>>,
        scores: &mut HashMap<DocId, f64>,
    ) {
        let num_docs = stats.num_docs();
        let avg_len = stats.avg_len();
        for term in terms {
            let postings = stats.postings(term);
            if postings.is_empty() {
                continue;
            }
            let term_idf = idf(num_docs, postings.len());
            for p in postings {
                if allowed.is_some_and(|set| !set.contains(&p.doc_id)) {
                    continue;
                }
                let w = term_idf * term_weight(p.tf, stats.doc_len(p.doc_id), avg_len, self.params);
                *scores.entry(p.doc_id).or_insert(0.0) += boost * w;
            }
        }
    }

    /// Documents passing every filter, or `None` when there are no filters.
    fn filter_set(&self, filters: &BTreeMap<String, String>) -> Result<Option<HashSet<DocId>>> {
        let mut allowed: Option<HashSet<DocId>> = None;
        for (name, value) in filters {
            let values = self
                .keywords
                .get(name)
                .ok_or_else(|| SearchError::UnknownFilterField(name.clone()))?;
            let ids: HashSet<DocId> = values.get(value).map(|ids| ids.iter().copied().collect()).unwrap_or_default();
            allowed = Some(match allowed {
                Some(prev) => prev.intersection(&ids).copied().collect(),
                None => ids,
            });
        }
        Ok(allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idf_is_positive_and_decreasing() {
        assert!(idf(10, 10) > 0.0);
        assert!(idf(10, 1) > idf(10, 5));
    }

    #[test]
    fn term_weight_saturates() {
        let params = Bm25Params::default();
        let one = term_weight(1, 10, 10.0, params);
        let two = term_weight(2, 10, 10.0, params);
        let ten = term_weight(10, 10, 10.0, params);
        assert!(two > one);
        assert!(two - one > ten - term_weight(9, 10, 10.0, params));
        assert!(ten < params.k1() + 1.0);
    }

    #[test]
    fn longer_documents_weigh_less() {
        let params = Bm25Params::default();
        assert!(term_weight(1, 5, 10.0, params) > term_weight(1, 20, 10.0, params));
        let flat = Bm25Params::new(1.5, 0.0).unwrap();
        assert_eq!(term_weight(1, 5, 10.0, flat), term_weight(1, 20, 10.0, flat));
    }
}
