//! Groq chat completion client (OpenAI-compatible endpoint).

use crate::api::{ApiError, classify_transport, remote_message};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Default model; overridable through `config.toml`.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Fixed system instruction sent with every prompt.
const SYSTEM_PROMPT: &str = "You are a helpful assistant knowledgeable about health, food, \
     and nutrition. Provide concise and informative answers.";

/// Response-length cap, in tokens.
const MAX_TOKENS: u32 = 250;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}

/// Client for the chat completion service.
///
/// The API key is cached from settings; an authentication failure drops it so
/// every later call reports `MissingKey` until [`ChatClient::configure`]
/// installs a fresh one.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: Client,
    api_key: Option<String>,
    model: String,
}

impl ChatClient {
    /// Builds a client; `api_key` may be absent until the user saves one.
    #[must_use]
    pub fn new(api_key: Option<&str>, model: &str, timeout: Duration) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            api_key: normalize_key(api_key),
            model: model.to_string(),
        }
    }

    /// Installs a new API key from settings.
    pub fn configure(&mut self, api_key: &str) {
        self.api_key = normalize_key(Some(api_key));
        debug!("Chat client reconfigured (key present: {})", self.api_key.is_some());
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Drops the cached key. Callers that run [`ChatClient::generate`] on a
    /// clone use this to mirror an auth failure back onto the original.
    pub fn invalidate(&mut self) {
        self.api_key = None;
    }

    /// Sends a prompt and returns the model's text completion, trimmed.
    ///
    /// # Errors
    ///
    /// `MissingKey` when no key is configured; `InvalidKey` on 401 (which also
    /// drops the cached key); `RateLimited` on 429; `BadRequest` on 400 with
    /// the service's own message; `Remote` for other rejections; `Timeout` /
    /// `Connection` / `Parse` for local failures.
    #[instrument(skip(self, prompt))]
    pub async fn generate(&mut self, prompt: &str) -> Result<String, ApiError> {
        let Some(api_key) = self.api_key.clone() else {
            warn!("Chat prompt attempted without an API key");
            return Err(ApiError::MissingKey);
        };

        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
        };

        debug!("Sending chat completion request (model: {})", self.model);
        let response = self
            .http
            .post(BASE_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        debug!("Groq response status: {}", status);
        match status {
            StatusCode::UNAUTHORIZED => {
                // Force re-configuration on the next call
                warn!("Chat service rejected the API key; dropping it");
                self.api_key = None;
                return Err(ApiError::InvalidKey);
            }
            StatusCode::TOO_MANY_REQUESTS => return Err(ApiError::RateLimited),
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::BadRequest(remote_message(&body)));
            }
            s if s.is_client_error() || s.is_server_error() => {
                let body = response.text().await.unwrap_or_default();
                return Err(ApiError::Remote {
                    status: s.as_u16(),
                    message: remote_message(&body),
                });
            }
            _ => {}
        }

        let parsed: ChatResponse = response.json().await.map_err(classify_transport)?;
        let text = extract_content(parsed)?;
        info!("Chat completion received ({} chars)", text.len());
        Ok(text)
    }
}

fn normalize_key(api_key: Option<&str>) -> Option<String> {
    api_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToString::to_string)
}

fn extract_content(response: ChatResponse) -> Result<String, ApiError> {
    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.trim().to_string())
        .ok_or_else(|| ApiError::Parse("response contained no choices".to_string()))
}
