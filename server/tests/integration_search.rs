use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use mdsearch_core::{Record, SearchConfig};
use mdsearch_indexer::build_index;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

fn tiny_app() -> Router {
    let records = vec![
        Record::new("intro.md").with_field("content", "getting started with tools").with_field("filename", "intro.md"),
        Record::new("advanced.md")
            .with_field("content", "advanced tool configuration")
            .with_field("filename", "advanced.md"),
        Record::new("other.md").with_field("content", "unrelated topic").with_field("filename", "other.md"),
    ];
    let config = SearchConfig::default();
    let index = build_index(records, &config);
    mdsearch_server::build_app(Arc::new(index), config)
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let (status, body) = call(tiny_app(), "/search?q=tool&k=5").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 1);
    assert_eq!(arr[1]["doc_id"].as_u64().unwrap(), 0);
    assert_eq!(arr[0]["rank"].as_u64().unwrap(), 1);
    assert_eq!(arr[0]["filename"], "advanced.md");
    assert_eq!(arr[0]["snippet"], "advanced <em>tool</em> configuration");
    assert_eq!(json["total_returned"].as_u64().unwrap(), 2);
}

#[tokio::test]
async fn punctuated_query_is_ranked_and_highlighted() {
    let (status, body) = call(tiny_app(), "/search?q=tool%3F").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["snippet"], "advanced <em>tool</em> configuration");
}

#[tokio::test]
async fn search_truncates_to_k() {
    let (status, body) = call(tiny_app(), "/search?q=tool&k=1").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn zero_k_is_a_bad_request() {
    let (status, body) = call(tiny_app(), "/search?q=tool&k=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("at least 1"));
}

#[tokio::test]
async fn empty_query_returns_no_results() {
    let (status, body) = call(tiny_app(), "/search?q=").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn doc_and_stats_endpoints() {
    let (status, body) = call(tiny_app(), "/doc/2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["identifier"], "other.md");
    assert_eq!(json["fields"]["content"], "unrelated topic");

    let (status, _) = call(tiny_app(), "/doc/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(tiny_app(), "/stats").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["num_docs"].as_u64().unwrap(), 3);
    assert!(json["fields"]["content"]["num_terms"].as_u64().unwrap() > 0);

    let (status, body) = call(tiny_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], b"ok");
}
