use mdsearch_core::{DocId, Field, ScoredResult};
use serde::Serialize;

/// First `max_chars` characters of `text` on one line.
pub fn preview(text: &str, max_chars: usize) -> String {
    let head: String = text.chars().take(max_chars).collect();
    head.replace(['\r', '\n'], " ").trim().to_string()
}

/// Numbered filename plus content preview per result.
pub fn format_results(query: &str, results: &[ScoredResult<'_>], preview_chars: usize) -> String {
    if results.is_empty() {
        return format!("No results found for query: '{query}'");
    }
    let mut out = vec![format!("Search results for '{query}':\n")];
    for r in results {
        out.push(format!("\n{}. {}", r.rank, r.document.text(Field::Filename)));
        out.push(format!("   {}...", preview(r.document.text(Field::Content), preview_chars)));
    }
    out.join("\n")
}

/// Flat, serializable view of one result.
#[derive(Debug, Serialize)]
pub struct ResultView<'a> {
    pub rank: usize,
    pub doc_id: DocId,
    pub identifier: &'a str,
    pub filename: &'a str,
    pub score: f64,
    pub preview: String,
}

impl<'a> ResultView<'a> {
    pub fn new(result: &ScoredResult<'a>, preview_chars: usize) -> Self {
        let doc = result.document;
        Self {
            rank: result.rank,
            doc_id: doc.id,
            identifier: &doc.identifier,
            filename: doc.text(Field::Filename),
            score: result.score,
            preview: preview(doc.text(Field::Content), preview_chars),
        }
    }
}
