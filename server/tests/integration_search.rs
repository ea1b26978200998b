use axum::body::{Body, Bytes};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::tempdir;
use tower::ServiceExt;
use webdex_core::builder::build_index;
use webdex_core::emitter::PostingEmitter;
use webdex_core::sort::sort_segments;
use webdex_core::{EngineConfig, IndexPaths};

fn build_tiny_index(dir: &std::path::Path) {
    let paths = IndexPaths::new(dir);
    let mut emitter = PostingEmitter::create(paths.clone()).unwrap();
    let mut seg = emitter.begin_segment(1).unwrap();
    let pages = [
        ("http://one.example/", "Rust is great. Rust systems programming with rust."),
        ("http://two.example/", "Learning rust slowly with patient tutors"),
        ("http://three.example/", "Baking sourdough bread at home"),
        ("http://four.example/", "Painting watercolor landscapes outdoors"),
        ("http://five.example/", "Sailing small boats across calm lakes"),
    ];
    for (url, body) in pages {
        seg.emit(Some(url), body).unwrap();
    }
    seg.finish().unwrap();
    emitter.finish().unwrap();
    sort_segments(&paths.list_segments().unwrap(), &paths.sorted()).unwrap();
    build_index(&paths).unwrap();
}

async fn call(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    (status, body)
}

fn app_for(dir: &std::path::Path) -> Router {
    webdex_server::build_app(dir.to_string_lossy().to_string(), EngineConfig::default()).unwrap()
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());

    let (status, body) = call(app_for(dir.path()), "/search?q=rust&mode=union&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["mode"], "union");
    assert_eq!(json["total_hits"], 2);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 1);
    assert_eq!(arr[1]["doc_id"].as_u64().unwrap(), 2);
    assert!(arr[0]["score"].as_f64().unwrap() > arr[1]["score"].as_f64().unwrap());
    assert!(arr[0]["snippet"].as_str().unwrap().starts_with("Rust is great."));
}

#[tokio::test]
async fn intersection_is_the_default_mode() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());

    let (status, body) = call(app_for(dir.path()), "/search?q=rust%20tutors").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["mode"], "intersection");
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["url"], "http://two.example/");
}

#[tokio::test]
async fn rejects_unknown_mode_and_missing_docs() {
    let dir = tempdir().unwrap();
    build_tiny_index(dir.path());

    let (status, _) = call(app_for(dir.path()), "/search?q=rust&mode=fuzzy").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(app_for(dir.path()), "/doc/3").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["url"], "http://three.example/");

    let (status, _) = call(app_for(dir.path()), "/doc/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
