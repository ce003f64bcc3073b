//! Client-side error model, one enum per boundary.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use jobboard_auth::Capability;
use jobboard_core::DomainError;

/// Durable session storage failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("session storage lock poisoned")]
    Poisoned,
}

/// Sign-in / registration failure. Never retried automatically.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The backend refused the request; `message` is its explanation.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("a sign-in request is already in progress")]
    InFlight,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("unexpected response from auth endpoint: {0}")]
    Decode(String),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

impl AuthError {
    /// Text a view can show next to the form.
    pub fn message(&self) -> String {
        match self {
            AuthError::Rejected { message, .. } => message.clone(),
            AuthError::Network(_) => "Unable to reach the server. Please try again.".to_string(),
            other => other.to_string(),
        }
    }
}

/// Resource call failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the bearer token; the session has been cleared.
    #[error("session expired or rejected; please sign in again")]
    Unauthorized,

    /// Refused locally before any request was sent.
    #[error("not permitted: requires '{0}'")]
    Forbidden(Capability),

    #[error("already applied to this job")]
    AlreadyApplied,

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response body: {0}")]
    Decode(String),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Human-readable message from a failed response body.
///
/// Prefers `{ "message": ... }`, then `{ "error": ... }`, then a short plain
/// text body, then the status reason.
pub(crate) fn backend_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(message) = parsed.message.or(parsed.error) {
            if !message.trim().is_empty() {
                return message;
            }
        }
    }

    let text = body.trim();
    if !text.is_empty() && text.len() <= 200 && !text.starts_with(['{', '<']) {
        return text.to_string();
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()))
}
