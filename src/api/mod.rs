//! Clients for the two external collaborators: the Spoonacular recipe lookup
//! service and the Groq chat completion service.
//!
//! Failures are classified into [`ApiError`] so callers branch on an explicit
//! variant instead of probing a payload; the `Display` text of each variant is
//! the message shown to the user. An `ApiError` only ever affects the lookup
//! or chat feature that raised it and never crosses into the repository or
//! aggregation code.

/// Groq chat completion client
pub mod groq;

/// Spoonacular recipe search client and result mapper
pub mod spoonacular;

pub use groq::ChatClient;
pub use spoonacular::{LookupOutcome, RecipeClient};

use thiserror::Error;

/// Classified failure from an external service call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("API key missing. Please save it in Settings.")]
    MissingKey,

    #[error("Query cannot be empty.")]
    EmptyQuery,

    #[error("Invalid API key. Please recheck and save it in Settings.")]
    InvalidKey,

    #[error("API quota exceeded for today.")]
    QuotaExceeded,

    #[error("Rate limit or quota exceeded. Please check your account usage.")]
    RateLimited,

    #[error("The service rejected the request: {0}")]
    BadRequest(String),

    #[error("Service error {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Request timed out.")]
    Timeout,

    #[error("Could not connect to the service. Check your internet connection.")]
    Connection,

    #[error("Failed to parse the service response: {0}")]
    Parse(String),

    #[error("An unexpected error occurred: {0}")]
    Other(String),
}

/// Maps a transport-level reqwest failure onto the local taxonomy.
pub(crate) fn classify_transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else if err.is_connect() {
        ApiError::Connection
    } else if err.is_decode() {
        ApiError::Parse(err.to_string())
    } else {
        ApiError::Other(err.to_string())
    }
}

/// Pulls a human-readable message out of an error response body.
///
/// Spoonacular nests it as `{"message": ...}`, the OpenAI-compatible Groq
/// endpoint as `{"error": {"message": ...}}`; anything else falls back to the
/// raw body text.
pub(crate) fn remote_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
    }
    body.to_string()
}
