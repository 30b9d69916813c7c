use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors surfaced by the identity webhook. Anything besides a missing
/// secret or a directory failure is the sender's fault and maps to 400.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Missing webhook secret")]
    MissingSecret,
    #[error("Missing Svix headers")]
    MissingHeaders,
    #[error("Invalid webhook secret")]
    BadSecret,
    #[error("Verification error")]
    BadSignature,
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Directory update failed: {0}")]
    Directory(String),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match self {
            WebhookError::MissingSecret | WebhookError::Directory(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            WebhookError::MissingHeaders
            | WebhookError::BadSecret
            | WebhookError::BadSignature
            | WebhookError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}
