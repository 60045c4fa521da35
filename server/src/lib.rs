use anyhow::Result;
use axum::{extract::{Path, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use parking_lot::RwLock;
use reelmatch_core::persist::{load_snapshot, MetaFile, SnapshotPaths};
use reelmatch_core::ranker::DEFAULT_COUNT;
use reelmatch_core::{MovieRecord, Recommender, Signals};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct RecommendParams {
    pub titles: Vec<String>,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { DEFAULT_COUNT }

#[derive(Serialize)]
pub struct RecommendResponse {
    /// Requested titles that exist in the catalog.
    pub selected: Vec<String>,
    pub took_s: f64,
    pub results: Vec<RecommendHit>,
}

#[derive(Serialize)]
pub struct RecommendHit {
    pub movie: MovieRecord,
    pub score: f64,
    pub explanation: String,
    pub signals: Signals,
}

#[derive(Serialize)]
pub struct MoviesResponse {
    pub total: usize,
    pub snapshot_created_at: String,
    pub titles: Vec<String>,
}

/// Engine and the meta it was loaded with, always swapped together.
pub struct Snapshot {
    pub engine: Recommender,
    pub meta: MetaFile,
}

#[derive(Clone)]
pub struct AppState {
    pub snapshot_root: PathBuf,
    /// Swapped whole on reload; readers clone the inner `Arc` and never see a partial build.
    pub snapshot: Arc<RwLock<Arc<Snapshot>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    pub fn new(snapshot_root: PathBuf, engine: Recommender, meta: MetaFile, admin_token: Option<String>) -> Self {
        Self { snapshot_root, snapshot: Arc::new(RwLock::new(Arc::new(Snapshot { engine, meta }))), admin_token }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> { self.snapshot.read().clone() }

    pub fn replace(&self, engine: Recommender, meta: MetaFile) {
        *self.snapshot.write() = Arc::new(Snapshot { engine, meta });
    }
}

pub fn build_app(index_dir: String) -> Result<Router> {
    let admin_token = std::env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty());
    build_app_with_token(index_dir, admin_token)
}

pub fn build_app_with_token(index_dir: String, admin_token: Option<String>) -> Result<Router> {
    // Load snapshot at startup
    let (engine, meta) = load_snapshot(&SnapshotPaths::new(&index_dir))?;
    let app_state = AppState::new(PathBuf::from(&index_dir), engine, meta, admin_token);

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

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/recommend", post(recommend_handler))
        .route("/movies", get(movies_handler))
        .route("/movie/:title", get(movie_handler))
        .route("/catalog/reload", post(reload_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn recommend_handler(State(state): State<AppState>, Json(params): Json<RecommendParams>) -> Json<RecommendResponse> {
    let start = std::time::Instant::now();
    let snap = state.snapshot();
    let engine = &snap.engine;
    let k = params.k.clamp(1, MAX_K);

    let selected: Vec<String> = engine
        .resolve(params.titles.as_slice())
        .into_iter()
        .map(|i| engine.movies()[i].title.clone())
        .collect();
    let results: Vec<RecommendHit> = engine
        .recommend(params.titles.as_slice(), k)
        .into_iter()
        .map(|r| RecommendHit { movie: r.movie.clone(), score: r.score, explanation: r.explanation, signals: r.signals })
        .collect();

    let took_s = start.elapsed().as_secs_f64();
    tracing::debug!(requested = params.titles.len(), hits = results.len(), took_s, "recommend");
    Json(RecommendResponse { selected, took_s, results })
}

pub async fn movies_handler(State(state): State<AppState>) -> Json<MoviesResponse> {
    let snap = state.snapshot();
    let titles: Vec<String> = snap.engine.movies().iter().map(|m| m.title.clone()).collect();
    let snapshot_created_at = snap.meta.created_at.clone();
    Json(MoviesResponse { total: titles.len(), snapshot_created_at, titles })
}

pub async fn movie_handler(State(state): State<AppState>, Path(title): Path<String>) -> Result<Json<MovieRecord>, (StatusCode, Json<serde_json::Value>)> {
    let snap = state.snapshot();
    match snap.engine.get(&title) {
        Some(movie) => Ok(Json(movie.clone())),
        None => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" })))),
    }
}

// --- Admin endpoints ---
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<MetaFile>, (StatusCode, String)> {
    authorize(&state, &headers)?;
    let root = state.snapshot_root.clone();
    let (engine, meta) = tokio::task::spawn_blocking(move || load_snapshot(&SnapshotPaths::new(root)))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("reload failed: {e:#}")))?;

    state.replace(engine, meta.clone());
    tracing::info!(num_movies = meta.num_movies, "catalog reloaded");
    Ok(Json(meta))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
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
