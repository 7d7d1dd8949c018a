use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use searchify_core::{
    DocId, DocMeta, Error as CoreError, Indexer, IndexerConfig, SearchConfig, Searcher, SledStore,
    PostingStore, StoreConfig, StoreError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub source: Option<String>,
    pub title: Option<String>,
}

#[derive(Deserialize)]
pub struct IndexRequest {
    pub text: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Serialize)]
pub struct IndexResponse {
    pub doc_id: DocId,
    pub terms: usize,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub last_document_id: DocId,
    pub num_terms: usize,
    pub num_docs: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<SledStore>,
    pub searcher: Arc<Searcher<SledStore>>,
    pub indexer: Arc<Indexer<SledStore>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<SledStore>, admin_token: Option<String>) -> Self {
        Self {
            searcher: Arc::new(Searcher::new(store.clone(), SearchConfig::default())),
            indexer: Arc::new(Indexer::new(store.clone(), IndexerConfig::default())),
            store,
            admin_token,
        }
    }
}

pub type ApiError = (StatusCode, String);

fn api_error(e: CoreError) -> ApiError {
    let status = match &e {
        CoreError::Ordering(_) => StatusCode::CONFLICT,
        CoreError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        CoreError::Decode(_) | CoreError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(error = %e, "request failed");
    }
    (status, e.to_string())
}

fn store_error(e: StoreError) -> ApiError { api_error(e.into()) }

fn cors_from_env() -> CorsLayer {
    // CORS_ALLOW_ORIGIN is comma-separated; unset or unparsable allows any origin
    let origins: Vec<HeaderValue> = std::env::var("CORS_ALLOW_ORIGIN")
        .map(|val| val.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_default();
    let allow = if origins.is_empty() { AllowOrigin::any() } else { AllowOrigin::list(origins) };
    CorsLayer::new().allow_origin(allow).allow_methods(Any).allow_headers(Any)
}

/// Opens the sled index at `index_dir` and reads `ADMIN_TOKEN` from the environment.
pub fn open_state(index_dir: &str) -> Result<AppState> {
    let store = Arc::new(SledStore::open(&StoreConfig::new(index_dir))?);
    let admin_token = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());
    if admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set, POST /index is disabled");
    }
    tracing::info!(index_dir, terms = store.num_terms(), docs = store.num_docs(), "index opened");
    Ok(AppState::new(store, admin_token))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/stats", get(stats_handler))
        .route("/index", post(index_handler))
        .with_state(state)
        .layer(cors_from_env())
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let ranked = state.searcher.search_scored(&params.q).await.map_err(api_error)?;
    let total_hits = ranked.len();
    let k = params.k.clamp(1, MAX_K);

    let mut results = Vec::with_capacity(k.min(total_hits));
    for hit in ranked.into_iter().take(k) {
        let meta = state.store.doc_meta(hit.doc_id).map_err(store_error)?;
        let (source, title) = meta.map_or((None, None), |m| (Some(m.source), m.title));
        results.push(SearchHit { doc_id: hit.doc_id, score: hit.score, source, title });
    }

    Ok(Json(SearchResponse { query: params.q, took_s: start.elapsed().as_secs_f64(), total_hits, results }))
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    match state.store.doc_meta(doc_id).map_err(store_error)? {
        Some(meta) => Ok(Json(serde_json::json!({
            "doc_id": doc_id,
            "source": meta.source,
            "title": meta.title,
            "indexed_at": meta.indexed_at,
        }))),
        None => Err((StatusCode::NOT_FOUND, format!("document {doc_id} not found"))),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, ApiError> {
    let last_document_id = state.store.last_document_id().await.map_err(store_error)?;
    Ok(Json(StatsResponse {
        last_document_id,
        num_terms: state.store.num_terms(),
        num_docs: state.store.num_docs(),
    }))
}

async fn index_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<IndexRequest>,
) -> Result<Json<IndexResponse>, ApiError> {
    authorize(&state, &headers)?;
    let report = state.indexer.index_next(&req.text).await.map_err(api_error)?;
    let meta = DocMeta {
        source: req.source.unwrap_or_else(|| format!("api:{}", report.document_id)),
        title: req.title,
        indexed_at: OffsetDateTime::now_utc().format(&Rfc3339).ok(),
    };
    state.store.put_doc_meta(report.document_id, &meta).map_err(store_error)?;
    Ok(Json(IndexResponse { doc_id: report.document_id, terms: report.terms }))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}
