use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use webdex_core::{DocId, EngineConfig, IndexPaths, QueryMode, SearchContext, SearchResult};

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub k: Option<usize>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: QueryMode,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<SearchContext>,
}

pub fn build_app(index_dir: String, config: EngineConfig) -> Result<Router> {
    // Lexicon and document mapping are loaded once, before the first request.
    let ctx = SearchContext::open(IndexPaths::new(&index_dir), config)?;
    tracing::info!(index = %index_dir, num_docs = ctx.num_docs(), num_terms = ctx.num_terms(), "index loaded");
    Ok(router(Arc::new(ctx)))
}

pub fn router(ctx: Arc<SearchContext>) -> Router {
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
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(AppState { ctx })
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let mode = match params.mode.as_deref() {
        None | Some("") => QueryMode::Intersection,
        Some(m) => m.parse::<QueryMode>().map_err(|e| (StatusCode::BAD_REQUEST, e))?,
    };
    let k = params.k.unwrap_or(state.ctx.config().result_limit).clamp(1, MAX_K);

    // Posting and document reads are blocking file I/O.
    let ctx = state.ctx.clone();
    let q = params.q.clone();
    let hits = tokio::task::spawn_blocking(move || ctx.search_top(&q, mode, k))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "search task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "search failed".to_string())
        })?;

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, %mode, hits = hits.total_hits, took_s = elapsed.as_secs_f64(), "search");
    Ok(Json(SearchResponse {
        query: params.q,
        mode,
        took_s: elapsed.as_secs_f64(),
        total_hits: hits.total_hits,
        results: hits.results,
    }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    match state.ctx.document(doc_id) {
        Some(meta) => Ok(Json(serde_json::json!({
            "doc_id": doc_id,
            "url": meta.url,
            "term_count": meta.term_count,
            "source_file": meta.source_file,
            "offset": meta.offset,
            "length": meta.length,
        }))),
        None => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" })))),
    }
}
