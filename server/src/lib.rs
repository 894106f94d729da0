use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use docsearch_core::config::DEFAULT_RESULT_LIMIT;
use docsearch_core::persist::read_index_file;
use docsearch_core::{
    ensure_index, index_directory_with_report, read_document, read_document_in_root, save_index, search_index,
    DocumentContent, EngineConfig, Index, ReadError, SearchError, SearchResult, SkippedFile,
};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub engine: EngineConfig,
    pub index_path: PathBuf,
    /// Required in `X-ADMIN-TOKEN` for rebuilds; rebuilds are refused when unset.
    pub admin_token: Option<String>,
    /// Comma-separated allowed origins; any origin when unset.
    pub cors_allow_origin: Option<String>,
}

impl ServerConfig {
    pub fn new<R: AsRef<FsPath>, I: AsRef<FsPath>>(root: R, index_path: I) -> Self {
        Self {
            engine: EngineConfig::new(root),
            index_path: index_path.as_ref().to_path_buf(),
            admin_token: None,
            cors_allow_origin: None,
        }
    }

    /// Reads `ADMIN_TOKEN` and `CORS_ALLOW_ORIGIN`.
    pub fn from_env<R: AsRef<FsPath>, I: AsRef<FsPath>>(root: R, index_path: I) -> Self {
        let mut config = Self::new(root, index_path);
        config.admin_token = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());
        config.cors_allow_origin = std::env::var("CORS_ALLOW_ORIGIN").ok();
        config
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { DEFAULT_RESULT_LIMIT }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Deserialize)]
pub struct ReadParams {
    pub path: String,
}

#[derive(Serialize)]
pub struct RebuildResponse {
    pub num_docs: usize,
    pub num_keywords: usize,
    pub skipped: Vec<SkippedFile>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<EngineConfig>,
    pub index_path: PathBuf,
    /// Swapped wholesale on rebuild; readers clone the inner `Arc` and release the lock.
    pub index: Arc<RwLock<Arc<Index>>>,
    /// Serializes rebuilds so only one writer touches the index file.
    pub rebuild_lock: Arc<Mutex<()>>,
    pub admin_token: Option<String>,
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

pub fn build_app(config: ServerConfig) -> Result<Router> {
    // Load the saved index, or build one when it is missing or empty
    let index = ensure_index(read_index_file(&config.index_path)?, &config.engine)?;
    tracing::info!(num_docs = index.len(), index = %config.index_path.display(), "index ready");

    let app_state = AppState {
        engine: Arc::new(config.engine),
        index_path: config.index_path,
        index: Arc::new(RwLock::new(Arc::new(index))),
        rebuild_lock: Arc::new(Mutex::new(())),
        admin_token: config.admin_token,
    };

    let cors = match config.cors_allow_origin {
        Some(val) => {
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
        None => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/read", get(read_handler))
        .route("/doc/*id", get(doc_handler))
        .route("/index/rebuild", post(rebuild_handler))
        .with_state(app_state)
        .layer(cors);
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let index = state.index.read().clone();
    let engine = state.engine.clone();
    let query = params.q.clone();
    let k = params.k;

    let results = tokio::task::spawn_blocking(move || search_index(&index, &query, k, &engine))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| match e {
            SearchError::InvalidLimit => api_error(StatusCode::BAD_REQUEST, e.to_string()),
            SearchError::Index(_) => api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        })?;

    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits: results.len(), results }))
}

pub async fn read_handler(
    State(state): State<AppState>,
    Query(params): Query<ReadParams>,
) -> Result<Json<DocumentContent>, ApiError> {
    let root = state.engine.root.clone();
    let doc = tokio::task::spawn_blocking(move || read_document_in_root(&root, &params.path))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(read_error)?;
    Ok(Json(doc))
}

pub async fn doc_handler(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let index = state.index.read().clone();
    let meta = match index.get(&id) {
        Some(d) => d.clone(),
        None => return Err(api_error(StatusCode::NOT_FOUND, format!("no indexed document {id}"))),
    };
    let path = meta.path.clone();
    let doc = tokio::task::spawn_blocking(move || read_document(&path))
        .await
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(read_error)?;
    Ok(Json(json!({
        "id": meta.id,
        "title": meta.title,
        "path": doc.path,
        "content": doc.content,
    })))
}

fn read_error(err: ReadError) -> ApiError {
    let status = match &err {
        ReadError::NotFound(_) => StatusCode::NOT_FOUND,
        ReadError::PermissionDenied(_) | ReadError::OutsideRoot(_) => StatusCode::FORBIDDEN,
        ReadError::Decode(_) | ReadError::NonUtf8Path(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ReadError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.to_string())
}

// --- Admin endpoints ---
async fn rebuild_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<RebuildResponse>, ApiError> {
    authorize(&state, &headers)?;
    let worker = state.clone();
    let response = tokio::task::spawn_blocking(move || -> Result<RebuildResponse, ApiError> {
        let _writer = worker.rebuild_lock.lock();
        let report = index_directory_with_report(&worker.engine)
            .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        save_index(&report.index, &worker.index_path)
            .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
        let response = RebuildResponse {
            num_docs: report.index.len(),
            num_keywords: report.index.keyword_postings.len(),
            skipped: report.skipped,
        };
        *worker.index.write() = Arc::new(report.index);
        Ok(response)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))??;
    tracing::info!(num_docs = response.num_docs, skipped = response.skipped.len(), "index rebuilt");
    Ok(Json(response))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(api_error(StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set")),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(api_error(StatusCode::UNAUTHORIZED, "invalid admin token"))
    }
}
