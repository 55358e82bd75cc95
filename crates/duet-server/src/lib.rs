pub mod api;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod health;
pub mod room;
pub mod room_manager;
pub mod signaling;
pub mod sse;
pub mod state;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use config::ServerConfig;
use room_manager::RoomManager;
use state::AppState;

/// Build the Axum router and application state from a config.
pub fn build_app(config: ServerConfig) -> (Router<()>, AppState) {
    let state = AppState::new(config);
    (router(state.clone()), state)
}

/// Like [`build_app`], around a prepared room manager.
pub fn build_app_with(config: ServerConfig, manager: RoomManager) -> (Router<()>, AppState) {
    let state = AppState::with_manager(config, manager);
    (router(state.clone()), state)
}

fn router(state: AppState) -> Router<()> {
    Router::new()
        .route("/api/room", get(api::get_room).post(api::post_action))
        .route("/api/room/events", get(sse::room_events))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
