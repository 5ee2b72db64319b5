//! Chat transcript and session continuity for one front end.

use palma_client::{ChatClient, SessionError, SessionStore, Source};
use tracing::{info, warn};

/// Shown in place of an answer when a call fails for any reason.
pub const FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Citations; only assistant answers carry them.
    pub sources: Vec<Source>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            sources: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            sources,
        }
    }
}

/// Transcript plus the session id replayed on every call.
pub struct Conversation<S: SessionStore> {
    client: ChatClient,
    store: S,
    session_id: Option<String>,
    messages: Vec<ChatMessage>,
}

impl<S: SessionStore> Conversation<S> {
    /// Start from whatever session id the store holds. An unreadable store
    /// starts a fresh session.
    pub fn new(client: ChatClient, store: S) -> Self {
        let session_id = store.load().unwrap_or_else(|e| {
            warn!(error = %e, "ignoring unreadable session store");
            None
        });
        Self {
            client,
            store,
            session_id,
            messages: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Send one user message. Blank input is ignored and returns `None`;
    /// otherwise the appended assistant message is returned, which is the
    /// generic failure text if the call failed.
    pub async fn send(&mut self, input: &str) -> Option<&ChatMessage> {
        if input.trim().is_empty() {
            return None;
        }
        self.messages.push(ChatMessage::user(input));

        let result = self
            .client
            .send_chat_message(input, self.session_id.as_deref())
            .await;
        let reply = match result {
            Ok(response) => {
                if self.session_id.as_deref() != Some(response.session_id.as_str()) {
                    info!("chat session id changed");
                }
                if let Err(e) = self.store.save(&response.session_id) {
                    warn!(error = %e, "failed to persist session id");
                }
                self.session_id = Some(response.session_id);
                let sources = response.sources.flatten().unwrap_or_default();
                ChatMessage::assistant(response.answer, sources)
            }
            Err(e) => {
                warn!(error = %e, "chat request failed");
                ChatMessage::assistant(FAILURE_MESSAGE, Vec::new())
            }
        };
        self.messages.push(reply);
        self.messages.last()
    }

    /// Forget the session: the next message starts a new one server-side.
    pub fn reset_session(&mut self) -> Result<(), SessionError> {
        self.store.clear()?;
        self.session_id = None;
        Ok(())
    }
}
