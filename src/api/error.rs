//! Handler error type and its HTTP mapping

use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use super::envelope::ApiErrorResponse;
use crate::engine::EngineError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Record store error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Engine task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Task(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(msg) => ApiErrorResponse::bad_request(msg),
            Self::Engine(e) => ApiErrorResponse::bad_request(e.to_string()),
            Self::Storage(e) => {
                warn!(error = %e, "Record store request failed");
                ApiErrorResponse::upstream(format!("Record store error: {e}"))
            }
            Self::Task(msg) => {
                error!(error = %msg, "Engine task failed");
                ApiErrorResponse::internal(format!("Engine task failed: {msg}"))
            }
        }
    }
}
