use crate::dto::response::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;
use tracing::error;

pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred";

/// Failures of a single thumbnail workflow invocation. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    /// No API credential configured; no request was sent.
    #[error("synthesis API credential is not configured")]
    MissingCredential,

    /// Transport failure, timeout or a non-2xx answer from the remote API.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered but produced nothing usable.
    #[error("image generation failed: {0}")]
    GenerationFailed(String),

    /// Base image or font could not be loaded.
    #[error("asset unavailable: {0}")]
    AssetUnavailable(String),

    #[error("failed to write image: {0}")]
    WriteFailed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for ThumbnailError {
    fn from(e: reqwest::Error) -> Self {
        ThumbnailError::Network(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ThumbnailError>;

pub type AppError = (StatusCode, Json<ErrorResponse>);

pub fn format_error(
    message: &str,
    error: impl std::fmt::Display,
    status: StatusCode,
) -> AppError {
    error!("Error occurred: {}: {}", message, error);
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

/// Turns a handler panic into the generic internal error body.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    format_error(INTERNAL_ERROR_MESSAGE, detail, StatusCode::INTERNAL_SERVER_ERROR).into_response()
}
