use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use duet_core::error::RoomError;

#[derive(Debug)]
pub enum AppError {
    Room(RoomError),
    InvalidRequest(String),
    Unavailable(String),
    Internal(String),
}

impl AppError {
    /// The one place error kinds map to HTTP status codes.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Room(RoomError::Forbidden) => StatusCode::FORBIDDEN,
            Self::Room(
                RoomError::RoomFull
                | RoomError::RoleTaken
                | RoomError::RoleLocked
                | RoomError::NeedBothPlayers,
            ) => StatusCode::CONFLICT,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Room(e) => e.code(),
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Unavailable(_) => "UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Room(e) => write!(f, "{e}"),
            Self::InvalidRequest(m) | Self::Unavailable(m) | Self::Internal(m) => {
                write!(f, "{m}")
            },
        }
    }
}

impl From<RoomError> for AppError {
    fn from(e: RoomError) -> Self {
        Self::Room(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}
