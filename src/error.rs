//! Errors surfaced by the quiz API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::state::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid session")]
    InvalidSession,

    #[error("No active question")]
    NoActiveQuestion,

    #[error("No players available for {0} difficulty. Please regenerate player data.")]
    NoPlayers(String),

    #[error("Player data incomplete for {0}. Please regenerate player data.")]
    IncompletePlayer(String),

    #[error("Missing required fields")]
    MissingFields,

    /// Body was not valid JSON for the endpoint
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Storage failures carry the message shown to clients; the cause is logged
    #[error("{message}")]
    Storage {
        message: &'static str,
        #[source]
        source: StoreError,
    },
}

impl ApiError {
    pub fn storage(message: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| ApiError::Storage { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidSession
            | ApiError::NoActiveQuestion
            | ApiError::NoPlayers(_)
            | ApiError::MissingFields
            | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::IncompletePlayer(_) | ApiError::Storage { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            ApiError::Storage { source, .. } => tracing::error!("{}: {}", self, source),
            ApiError::IncompletePlayer(_) => tracing::warn!("{}", self),
            _ => tracing::debug!("Rejected request: {}", self),
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::InvalidSession.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingFields.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::IncompletePlayer("X".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::InvalidBody("EOF".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        let err = ApiError::storage("Failed to save score")(StoreError::Database(sqlx::Error::RowNotFound));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to save score");
    }
}
