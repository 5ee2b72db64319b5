//! Chat session client: one POST per query, or a canned reply in mock mode.

use async_trait::async_trait;
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, warn};

pub use reqwest::StatusCode;

use crate::config::{ConfigError, Settings};
use crate::messages::{ChatRequest, ChatResponse};
use crate::mock::MockBackend;

/// Errors from a single chat call.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// The server answered with a non-2xx status. `body` is the raw response text.
    #[error("Chat API error: {body}")]
    Api { status: StatusCode, body: String },
    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed chat response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ChatError {
    /// Raw server text for [`ChatError::Api`].
    pub fn api_body(&self) -> Option<&str> {
        match self {
            ChatError::Api { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Something that can answer a chat query.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn send_chat_message(
        &self,
        query: &str,
        session_id: Option<&str>,
    ) -> Result<ChatResponse, ChatError>;
}

/// Backend that talks to `{base_url}/chat`.
#[derive(Debug, Clone)]
pub struct LiveBackend {
    http: reqwest::Client,
    endpoint: String,
}

impl LiveBackend {
    pub fn new(base_url: &Url) -> Self {
        Self::with_http_client(base_url, reqwest::Client::new())
    }

    /// Use a caller-built HTTP client, e.g. one with a request timeout.
    pub fn with_http_client(base_url: &Url, http: reqwest::Client) -> Self {
        Self {
            http,
            endpoint: chat_endpoint(base_url),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn chat_endpoint(base_url: &Url) -> String {
    format!("{}/chat", base_url.as_str().trim_end_matches('/'))
}

#[async_trait]
impl ChatBackend for LiveBackend {
    async fn send_chat_message(
        &self,
        query: &str,
        session_id: Option<&str>,
    ) -> Result<ChatResponse, ChatError> {
        let request = ChatRequest::new(query, session_id);
        debug!(
            endpoint = %self.endpoint,
            has_session = session_id.is_some(),
            "sending chat request"
        );

        let response = self.http.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            warn!(%status, "chat API returned an error");
            return Err(ChatError::Api { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Client handle holding the backend chosen at startup.
#[derive(Clone)]
pub struct ChatClient {
    backend: Arc<dyn ChatBackend>,
    mock: bool,
}

impl ChatClient {
    /// Build the client for resolved settings. Settings cannot exist without a
    /// valid base URL, so this never produces a client aimed at a blank endpoint.
    pub fn from_settings(settings: &Settings) -> Self {
        if settings.use_mock {
            debug!("chat client in mock mode");
            Self::mock()
        } else {
            Self::new(LiveBackend::new(&settings.base_url))
        }
    }

    /// Live client for `base_url`, validated the same way as configuration.
    pub fn live(base_url: &str) -> Result<Self, ConfigError> {
        let url = crate::config::parse_base_url(base_url)?;
        Ok(Self::new(LiveBackend::new(&url)))
    }

    pub fn new(backend: impl ChatBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
            mock: false,
        }
    }

    /// Offline client with the canned reply and standard latency.
    pub fn mock() -> Self {
        Self {
            backend: Arc::new(MockBackend::new()),
            mock: true,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.mock
    }

    /// Send `query`, replaying `session_id` from the previous response if any.
    pub async fn send_chat_message(
        &self,
        query: &str,
        session_id: Option<&str>,
    ) -> Result<ChatResponse, ChatError> {
        self.backend.send_chat_message(query, session_id).await
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient").field("mock", &self.mock).finish()
    }
}
