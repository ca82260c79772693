use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Startup configuration failures. These abort the process before the
/// server ever binds.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("environment variable {name} is invalid: {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

/// Failures from the translation provider or the token exchange in front
/// of it. Callers see these collapsed into a single "upstream unavailable"
/// response; the variants exist so the cause can be logged.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("token exchange failed: {0}")]
    Auth(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    Decode(String),
}

/// Request-level errors surfaced by the transport gateway.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("Empty text")]
    EmptyText,
    #[error("upstream unavailable")]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            RelayError::EmptyText => (StatusCode::BAD_REQUEST, "Empty text"),
            RelayError::Upstream(cause) => {
                error!("upstream call failed: {}", cause);
                (StatusCode::BAD_GATEWAY, "upstream unavailable")
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
