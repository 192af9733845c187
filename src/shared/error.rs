//! Application Error Types
//!
//! Centralized error handling with Axum integration, plus the error
//! taxonomy reported to real-time clients over the socket.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, 10001, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, 10002, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, 10003, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, 10004, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, 10007, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, 10000, "Internal server error".into())
            }
        };

        let body = ErrorResponse { code, message };

        (status, Json(body)).into_response()
    }
}

/// Errors surfaced by the real-time collaboration layer.
///
/// Each variant is terminal for the single request that produced it; none of
/// them close the connection except `Authentication`, which can only occur
/// during the handshake.
#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    /// Missing, malformed, badly signed or expired handshake credential.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The user is not a member of the project that owns the room.
    #[error("Not authorized to join {0}")]
    Authorization(String),

    /// The request needs an active room and the connection holds none.
    #[error("Not in a room")]
    NotInRoom,

    /// The message store rejected the insert; nothing was broadcast.
    #[error("Failed to persist message: {0}")]
    Persistence(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// A directory lookup failed while authorizing or loading history.
    #[error("Store unavailable: {0}")]
    Store(String),
}

impl CollabError {
    /// Stable error code sent to clients in `error` frames.
    pub fn code(&self) -> &'static str {
        match self {
            CollabError::Authentication(_) => "authentication_failed",
            CollabError::Authorization(_) => "unauthorized",
            CollabError::NotInRoom => "not_in_room",
            CollabError::Persistence(_) => "persistence_failed",
            CollabError::InvalidPayload(_) => "invalid_payload",
            CollabError::Store(_) => "store_unavailable",
        }
    }
}

impl From<CollabError> for AppError {
    fn from(err: CollabError) -> Self {
        match err {
            CollabError::Authentication(msg) => AppError::Unauthorized(msg),
            CollabError::Authorization(room) => {
                AppError::Forbidden(format!("Not authorized to join {}", room))
            }
            CollabError::NotInRoom => AppError::BadRequest("Not in a room".into()),
            CollabError::InvalidPayload(msg) => AppError::Validation(msg),
            CollabError::Persistence(msg) | CollabError::Store(msg) => AppError::Internal(msg),
        }
    }
}
