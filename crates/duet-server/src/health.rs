use std::sync::atomic::Ordering;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

/// Structured health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub rooms: RoomInfo,
    pub streams: StreamInfo,
}

#[derive(Serialize)]
pub struct RoomInfo {
    pub active: usize,
    pub seated: usize,
}

#[derive(Serialize)]
pub struct StreamInfo {
    pub subscribers: usize,
}

/// Server status, room counts and open event streams.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let subscribers = state.sse_subscriber_count.load(Ordering::Relaxed);

    let (active, seated) = {
        let rooms = state.rooms.read().await;
        rooms.stats()
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        rooms: RoomInfo { active, seated },
        streams: StreamInfo { subscribers },
    })
}

/// Readiness check: the loaded configuration is usable.
pub async fn readiness_check(State(state): State<AppState>) -> &'static str {
    if state.config.validate().is_err() {
        return "not ready: invalid configuration";
    }
    "ready"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "healthy",
            version: "0.1.0",
            rooms: RoomInfo {
                active: 2,
                seated: 3,
            },
            streams: StreamInfo { subscribers: 4 },
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"healthy\""));
        assert!(json.contains("\"seated\":3"));
        assert!(json.contains("\"subscribers\":4"));
    }
}
