//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the mini app's REST endpoints and the bot bridge websocket under a
//! single Axum router. CORS is open so the Telegram web view can call in
//! from any origin.

pub mod api;
pub mod ws;

use axum::Router;
use axum::http::{Method, StatusCode, header};
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/settings", get(api::get_settings).post(api::save_settings))
        .route("/api/characters", get(api::list_characters).post(api::save_character))
        .route("/api/characters/{name}", get(api::get_character))
        .route("/api/get_character", get(api::get_cached_character).post(api::cache_character))
        .route("/api/init", post(api::create_init))
        .route("/api/init/{id}", get(api::get_init))
        .route("/api/store_data", post(api::store_data))
        .route("/api/get_data/{id}", get(api::get_data))
        .route("/api/ws", get(ws::handle_ws))
        .route("/healthz", get(healthz))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
