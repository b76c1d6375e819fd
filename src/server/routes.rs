//! HTTP route handlers for the coach API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::engine::{
    AnalyticsSnapshot, CoachResponse, EngineError, EntryId, Intent, KnowledgeRecord,
    ProcessOptions, ProviderStatus,
};

use super::state::AppState;

type ApiError = (StatusCode, String);

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat))
        .route("/api/analytics", get(analytics))
        .route("/api/analytics/users/{user_id}", get(user_requests))
        .route("/api/knowledge", get(list_knowledge).post(add_knowledge))
        .route("/api/knowledge/{id}", delete(remove_knowledge))
        .route("/api/knowledge/export", get(export_knowledge))
        .route("/api/knowledge/import", post(import_knowledge))
        .route("/api/cache", delete(clear_cache))
        .route("/api/providers", get(providers))
        .with_state(state)
}

fn engine_error(err: EngineError) -> ApiError {
    let status = match err {
        EngineError::InvalidKnowledgeEntry(_) | EngineError::Serialization(_) => {
            StatusCode::BAD_REQUEST
        }
        EngineError::KnowledgeEntryNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "coachbot",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Chat request.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// Caller identity used for analytics.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Skip the cache lookup.
    #[serde(default)]
    pub bypass_cache: bool,
    /// Skip the knowledge store for non-safety messages.
    #[serde(default)]
    pub force_external: bool,
}

/// Handle a chat message. Always answers 200 with a response body.
async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Json<CoachResponse> {
    let options = ProcessOptions {
        bypass_cache: request.bypass_cache,
        force_external: request.force_external,
    };
    let user_id = request.user_id.as_deref().unwrap_or("anonymous");

    Json(
        state
            .engine
            .process_message(&request.message, user_id, options)
            .await,
    )
}

async fn analytics(State(state): State<Arc<AppState>>) -> Json<AnalyticsSnapshot> {
    Json(state.engine.analytics())
}

/// Per-user request count.
#[derive(Debug, Serialize)]
pub struct UserRequests {
    /// The user id as queried.
    pub user_id: String,
    /// Requests received from that user.
    pub requests: u64,
}

async fn user_requests(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<UserRequests> {
    let requests = state.engine.requests_for_user(&user_id);
    Json(UserRequests { user_id, requests })
}

async fn providers(State(state): State<Arc<AppState>>) -> Json<Vec<ProviderStatus>> {
    Json(state.engine.provider_status())
}

async fn list_knowledge(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<KnowledgeRecord>>, ApiError> {
    state
        .engine
        .knowledge_entries()
        .map(Json)
        .map_err(engine_error)
}

/// New knowledge entry.
#[derive(Debug, Deserialize)]
pub struct NewEntryRequest {
    /// Phrases matched against messages.
    pub patterns: Vec<String>,
    /// Answer text.
    pub response: String,
    /// Category.
    pub category: Intent,
    /// Authored confidence in `(0, 1]`.
    pub confidence: f64,
}

/// Identifier of a created entry.
#[derive(Debug, Serialize)]
pub struct NewEntryResponse {
    /// The new entry id.
    pub id: EntryId,
}

async fn add_knowledge(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewEntryRequest>,
) -> Result<(StatusCode, Json<NewEntryResponse>), ApiError> {
    let id = state
        .engine
        .add_knowledge_entry(
            request.patterns,
            request.response,
            request.category,
            request.confidence,
        )
        .map_err(engine_error)?;

    Ok((StatusCode::CREATED, Json(NewEntryResponse { id })))
}

async fn remove_knowledge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id: EntryId = id
        .parse()
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid entry id: {e}")))?;

    state
        .engine
        .remove_knowledge_entry(id)
        .map_err(engine_error)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn export_knowledge(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let json = state.engine.export_knowledge().map_err(engine_error)?;
    Ok(([(header::CONTENT_TYPE, "application/json")], json))
}

/// Import outcome.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Number of entries added.
    pub imported: usize,
}

async fn import_knowledge(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    let imported = state.engine.import_knowledge(&body).map_err(engine_error)?;
    Ok(Json(ImportResponse { imported }))
}

async fn clear_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.engine.clear_cache();
    StatusCode::NO_CONTENT
}
