//! REST routes for the mini app: settings, characters, init data, blobs.
//!
//! Every response uses the `{ "success": bool, ... }` envelope the editor
//! scripts expect. Service errors map to status codes in one place
//! (`ApiError`'s `From` impls). JSON bodies are extracted as
//! `Result<Json<T>, JsonRejection>` so a bad body gets the same envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::services::character::{Character, CharacterDraft, CharacterError, CharacterName};
use crate::services::character_cache::CacheError;
use crate::services::init_data::InitDataError;
use crate::services::settings::{Settings, SettingsError};
use crate::state::{AppState, now_secs};

pub const DEFAULT_USER: &str = "default";

// =============================================================================
// ENVELOPE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self { success: true, data: Some(data) })
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "success": false, "error": self.message }))).into_response()
    }
}

impl From<CharacterError> for ApiError {
    fn from(err: CharacterError) -> Self {
        let status = match err {
            CharacterError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        let status = match err {
            CacheError::MissingName => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<SettingsError> for ApiError {
    fn from(err: SettingsError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl From<InitDataError> for ApiError {
    fn from(err: InitDataError) -> Self {
        let status = match err {
            InitDataError::NotFound => StatusCode::NOT_FOUND,
            InitDataError::Expired => StatusCode::GONE,
        };
        Self::new(status, err.to_string())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub user_id: Option<String>,
}

impl UserQuery {
    fn user_id(&self) -> &str {
        self.user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(DEFAULT_USER)
    }
}

// =============================================================================
// SETTINGS
// =============================================================================

/// `GET /api/settings`: stored settings or defaults.
pub async fn get_settings(State(state): State<AppState>, Query(query): Query<UserQuery>) -> Json<Envelope<Settings>> {
    let settings = state.settings.read().await.get(query.user_id());
    Envelope::ok(settings)
}

/// `POST /api/settings`: normalize and store.
pub async fn save_settings(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<Settings>>, ApiError> {
    let Json(raw) = payload?;
    let user_id = query.user_id();
    let saved = state
        .settings
        .write()
        .await
        .save(user_id, &raw, now_secs())
        .inspect_err(|e| warn!(%user_id, error = %e, "settings: rejected save"))?;
    info!(%user_id, model = %saved.model_name, "settings: saved");
    Ok(Envelope::ok(saved))
}

// =============================================================================
// CHARACTERS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct CharacterNames {
    pub character_names: Vec<CharacterName>,
}

/// `GET /api/characters`: built-in plus the user's own names.
pub async fn list_characters(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Json<Envelope<CharacterNames>> {
    let character_names = state.characters.read().await.list(query.user_id());
    Envelope::ok(CharacterNames { character_names })
}

/// `GET /api/characters/{name}`: one character.
pub async fn get_character(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Envelope<Character>>, ApiError> {
    let character = state.characters.read().await.get(&name, query.user_id())?;
    Ok(Envelope::ok(character))
}

/// `POST /api/characters`: create or update a user character.
pub async fn save_character(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    payload: Result<Json<CharacterDraft>, JsonRejection>,
) -> Result<Json<Envelope<Character>>, ApiError> {
    let Json(draft) = payload?;
    let user_id = query.user_id();
    let saved = state
        .characters
        .write()
        .await
        .save(user_id, draft)
        .inspect_err(|e| warn!(%user_id, error = %e, "characters: rejected save"))?;
    info!(%user_id, name = %saved.name, "characters: saved");
    Ok(Envelope::ok(saved))
}

// =============================================================================
// BOT CHARACTER SNAPSHOTS
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct NameQuery {
    pub name: Option<String>,
}

/// `GET /api/get_character?name=`: snapshot the bot posted for `name`.
pub async fn get_cached_character(
    State(state): State<AppState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let data = state
        .character_cache
        .read()
        .await
        .get(query.name.as_deref().unwrap_or_default())?;
    Ok(Envelope::ok(data))
}

/// `POST /api/get_character`: store the bot's snapshot under its name.
pub async fn cache_character(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(data) = payload?;
    let name = state.character_cache.write().await.put(data)?;
    info!(%name, "characters: cached bot snapshot");
    Ok(Json(json!({ "success": true })))
}

// =============================================================================
// INIT DATA
// =============================================================================

/// `POST /api/init`: stash launch state, return its session id.
pub async fn create_init(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(data) = payload?;
    let session_id = state.init_data.write().await.create(data, now_secs());
    info!(%session_id, "init: session created");
    Ok(Json(json!({ "success": true, "session_id": session_id })))
}

/// `GET /api/init/{id}`: fetch launch state by session id.
pub async fn get_init(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Envelope<Value>>, ApiError> {
    let Ok(session_id) = id.parse::<Uuid>() else {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "invalid session id"));
    };
    let data = state.init_data.write().await.get(session_id, now_secs())?;
    Ok(Envelope::ok(data))
}

// =============================================================================
// BLOBS
// =============================================================================

/// `POST /api/store_data`: store any JSON, return its id.
pub async fn store_data(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(data) = payload?;
    let id = state.blobs.write().await.store(data);
    Ok(Json(json!({ "success": true, "id": id })))
}

/// `GET /api/get_data/{id}`: fetch a stored blob.
pub async fn get_data(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Envelope<Value>>, ApiError> {
    let Ok(data_id) = id.parse::<Uuid>() else {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "invalid data id"));
    };
    state
        .blobs
        .read()
        .await
        .get(data_id)
        .map(Envelope::ok)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, format!("data with id {data_id} not found")))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
