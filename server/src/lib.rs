pub mod error;
pub mod responder;
pub mod store;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use concierge_core::loader::load_assets;
use concierge_core::model::{group_by_category, AssetCategory, Conversation, Message, Role};
use concierge_core::{Asset, IndexConfig, IndexStats, NewAsset, SharedIndex};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use error::ApiError;
use responder::{Responder, RuleBasedResponder};
use store::MemStore;

/// Results the chat flow folds into the responder context.
pub const DEFAULT_CHAT_TOP_K: usize = 3;
const MAX_K: usize = 100;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub index: IndexConfig,
    pub chat_top_k: usize,
    /// Record file or directory; the built-in sample assets when unset.
    pub assets_path: Option<PathBuf>,
    pub admin_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { index: IndexConfig::default(), chat_top_k: DEFAULT_CHAT_TOP_K, assets_path: None, admin_token: None }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemStore>,
    pub index: Arc<SharedIndex<Asset>>,
    pub responder: Arc<dyn Responder>,
    pub chat_top_k: usize,
    pub admin_token: Option<String>,
}

impl AppState {
    /// Wire up the store, index and responder, indexing whatever the store holds.
    pub fn new(store: MemStore, responder: Arc<dyn Responder>, config: &AppConfig) -> Result<Self> {
        let index = SharedIndex::new(config.index.clone());
        let stats = index.load(store.assets())?;
        tracing::info!(num_docs = stats.num_docs, num_terms = stats.num_terms, "knowledge base indexed");
        Ok(Self {
            store: Arc::new(store),
            index: Arc::new(index),
            responder,
            chat_top_k: config.chat_top_k,
            admin_token: config.admin_token.clone(),
        })
    }

    /// Rebuild the index from the current store contents. The store is read
    /// under the index's rebuild lock, so overlapping reindexes cannot
    /// publish an older asset list over a newer one. Runs on the blocking
    /// pool since a full rebuild is CPU-bound.
    async fn reindex(&self) -> Result<IndexStats, ApiError> {
        let store = Arc::clone(&self.store);
        let index = Arc::clone(&self.index);
        let stats = tokio::task::spawn_blocking(move || index.reload_with(|| store.assets()))
            .await
            .map_err(|e| ApiError::Internal(format!("index rebuild task failed: {e}")))??;
        Ok(stats)
    }
}

pub fn build_app(config: AppConfig) -> Result<Router> {
    let store = match &config.assets_path {
        Some(path) => MemStore::with_assets(load_assets(path)?),
        None => MemStore::with_sample_assets(),
    };
    let state = AppState::new(store, Arc::new(RuleBasedResponder), &config)?;
    Ok(build_router(state))
}

pub fn build_router(state: AppState) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
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
        .route("/api/assets", get(list_assets).post(create_asset))
        .route("/api/assets/search", get(search_assets))
        .route("/api/assets/relevant", get(relevant_assets))
        .route("/api/assets/:id", get(get_asset))
        .route("/api/index/rebuild", post(rebuild_index))
        .route("/api/chat", post(chat))
        .route("/api/conversations/:id", get(get_conversation))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub k: Option<usize>,
}

impl SearchParams {
    fn query(&self) -> Result<&str, ApiError> {
        match self.q.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => Ok(q),
            _ => Err(ApiError::BadRequest("Search query is required".into())),
        }
    }
}

#[derive(Serialize)]
pub struct RelevantResponse {
    pub query: String,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<RelevantHit>,
}

#[derive(Serialize)]
pub struct RelevantHit {
    pub id: String,
    pub score: f64,
    pub title: String,
    pub category: String,
    pub snippet: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub conversation_id: String,
    pub message: Message,
    pub relevant_assets: Vec<Asset>,
}

pub async fn list_assets(State(state): State<AppState>) -> Json<Vec<AssetCategory>> {
    let assets = state.store.assets();
    Json(group_by_category(assets.iter().map(|a| a.as_ref())))
}

pub async fn search_assets(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Asset>>, ApiError> {
    let q = params.query()?;
    Ok(Json(state.store.search_assets(q).iter().map(|a| a.as_ref().clone()).collect()))
}

/// Knowledge-base ranking straight from the retrieval index.
pub async fn relevant_assets(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<RelevantResponse>, ApiError> {
    let start = std::time::Instant::now();
    let q = params.query()?;
    let snapshot = state.index.snapshot();
    let k = params.k.unwrap_or(snapshot.config().default_top_k).min(MAX_K);
    let min = snapshot.config().min_similarity;
    let above: Vec<_> = snapshot.rank(q).into_iter().filter(|s| s.score > min).collect();
    let total_hits = above.len();
    let results = above
        .into_iter()
        .take(k)
        .map(|s| RelevantHit {
            id: s.record.id.clone(),
            score: s.score,
            title: s.record.title.clone(),
            category: s.record.category.clone(),
            snippet: s.record.content.chars().take(200).collect(),
        })
        .collect();
    Ok(Json(RelevantResponse { query: q.to_string(), took_s: start.elapsed().as_secs_f64(), total_hits, results }))
}

pub async fn get_asset(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Asset>, ApiError> {
    state
        .store
        .asset(&id)
        .map(|a| Json(a.as_ref().clone()))
        .ok_or_else(|| ApiError::NotFound("Asset not found".into()))
}

pub async fn create_asset(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<NewAsset>, JsonRejection>,
) -> Result<Json<Asset>, ApiError> {
    authorize(&state, &headers)?;
    let Json(mut new) = body.map_err(|_| ApiError::BadRequest("Invalid asset data".into()))?;
    if [&new.title, &new.content, &new.category].iter().any(|f| f.trim().is_empty()) {
        return Err(ApiError::BadRequest("Invalid asset data".into()));
    }
    new.id = None;
    let asset = state.store.create_asset(new);
    let stats = state.reindex().await?;
    tracing::info!(id = %asset.id, num_docs = stats.num_docs, "asset created");
    Ok(Json(asset.as_ref().clone()))
}

pub async fn rebuild_index(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<IndexStats>, ApiError> {
    authorize(&state, &headers)?;
    Ok(Json(state.reindex().await?))
}

pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = body.map_err(|_| ApiError::BadRequest("Message is required".into()))?;
    let text = match req.message.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => return Err(ApiError::BadRequest("Message is required".into())),
    };

    let conversation_id = match req.conversation_id {
        Some(id) => id,
        None => state.store.create_conversation().id,
    };
    let not_found = || ApiError::NotFound("Conversation not found".into());

    // Appends go through the store's write lock so concurrent messages on
    // one conversation are all kept.
    let history = state
        .store
        .append_messages(&conversation_id, [Message::new(Role::User, text.clone())])
        .ok_or_else(not_found)?
        .messages;

    let relevant = state.index.search(&text, state.chat_top_k);
    let context: Vec<String> = relevant.iter().map(|a| format!("{}: {}", a.title, a.content)).collect();
    let reply = state.responder.respond(&history, &context);

    let mut assistant = Message::new(Role::Assistant, reply.message);
    if !reply.cards.is_empty() {
        assistant.cards = Some(reply.cards);
    }
    state.store.append_messages(&conversation_id, [assistant.clone()]).ok_or_else(not_found)?;

    tracing::info!(conversation_id = %conversation_id, relevant = relevant.len(), "chat message handled");
    Ok(Json(ChatResponse {
        conversation_id,
        message: assistant,
        relevant_assets: relevant.iter().map(|a| a.as_ref().clone()).collect(),
    }))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    state.store.conversation(&id).map(Json).ok_or_else(|| ApiError::NotFound("Conversation not found".into()))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(ApiError::Unauthorized("ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("invalid admin token".into()))
    }
}
