use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use mdsearch_core::{DocId, Field, Index, IndexStats, SearchConfig, SearchError, SearchRequest};
use mdsearch_indexer::{build_index, loader};
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    /// Falls back to the configured default_k.
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_returned: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub rank: usize,
    pub doc_id: DocId,
    pub identifier: String,
    pub filename: String,
    pub score: f64,
    pub snippet: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<Index>,
    pub config: Arc<SearchConfig>,
}

pub struct ApiError(SearchError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

/// Load documents from `input`, index them once, and serve the result.
pub fn load_app(input: &FsPath, config: SearchConfig) -> Result<Router> {
    let records = loader::load(input, loader::InputKind::Auto)?;
    let index = build_index(records, &config);
    Ok(build_app(Arc::new(index), config))
}

pub fn build_app(index: Arc<Index>, config: SearchConfig) -> Router {
    let app_state = AppState { index, config: Arc::new(config) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/stats", get(stats_handler))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let k = params.k.unwrap_or(state.config.default_k);
    let request = SearchRequest::new(&params.q).k(k).boosts(state.config.boosts.clone());
    let scored = state.index.search_request(&request).map_err(ApiError)?;

    let highlighter = term_pattern(&params.q);
    let results: Vec<SearchHit> = scored
        .iter()
        .map(|r| {
            let doc = r.document;
            SearchHit {
                rank: r.rank,
                doc_id: doc.id,
                identifier: doc.identifier.clone(),
                filename: doc.text(Field::Filename).to_string(),
                score: r.score,
                snippet: snippet(doc.text(Field::Content), highlighter.as_ref()),
            }
        })
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, returned = results.len(), "served search");
    Ok(Json(SearchResponse {
        query: params.q,
        took_s: elapsed.as_secs_f64(),
        total_returned: results.len(),
        results,
    }))
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.index.stats())
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Response {
    match state.index.document(doc_id) {
        Some(doc) => Json(doc).into_response(),
        None => (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" }))).into_response(),
    }
}

/// Case-insensitive, word-bounded alternation of the query's letter/digit
/// runs, split the same way the index tokenizes.
fn term_pattern(query: &str) -> Option<Regex> {
    let mut words: Vec<String> = WORD.find_iter(query).map(|m| regex::escape(m.as_str())).collect();
    words.sort();
    words.dedup();
    if words.is_empty() {
        return None;
    }
    RegexBuilder::new(&format!(r"\b(?:{})\b", words.join("|")))
        .case_insensitive(true)
        .build()
        .ok()
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// About 300 bytes of `text` around the first query word, words wrapped in
/// `<em>`. Without a match, the first 200 characters.
fn snippet(text: &str, pattern: Option<&Regex>) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    let first = pattern.and_then(|re| re.find(text)).map(|m| m.start());
    let window = match first {
        Some(idx) => {
            let start = floor_boundary(text, idx.saturating_sub(100));
            let end = floor_boundary(text, (idx + 200).min(text.len()));
            &text[start..end]
        }
        None => {
            let end = text.char_indices().nth(200).map(|(i, _)| i).unwrap_or(text.len());
            &text[..end]
        }
    };
    Some(match pattern {
        Some(re) => re.replace_all(window, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).into_owned(),
        None => window.to_string(),
    })
}
