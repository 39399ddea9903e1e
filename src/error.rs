//! Error types for the LiteLLM local proxy
//!
//! Every error that reaches a caller is rendered as `{"error": "<message>"}`.

use std::error::Error as StdError;

use axum::{
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} is required in the configuration file")]
    MissingCredential(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Method {0} is not supported, only POST is forwarded")]
    UnsupportedMethod(Method),

    #[error("{0}")]
    UpstreamUnreachable(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl AppError {
    /// HTTP status reported to the caller
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            AppError::UnsupportedMethod(_) => StatusCode::NOT_IMPLEMENTED,
            AppError::MissingCredential(_) | AppError::InvalidConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

/// Any transport failure talking to upstream (connect, DNS, reset, timeout)
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::UpstreamUnreachable(describe_error_chain(&error))
    }
}

/// Render an error and all of its sources as a single line
///
/// `reqwest` keeps the useful detail (connection refused, DNS failure)
/// in the source chain rather than the top-level message.
pub fn describe_error_chain(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
