//! Wire types for the `/chat` endpoint. Client ↔ server JSON.

use serde::{Deserialize, Deserializer, Serialize};

/// Knowledge corpus every query is scoped to. Fixed for this deployment.
pub const NAMESPACE: &str = "https://www.modularmanagement.com/";

/// Client → server: chat request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub query: &'a str,
    /// Serialized as `null` on the first message of a session.
    pub session_id: Option<&'a str>,
    pub namespace: &'static str,
}

impl<'a> ChatRequest<'a> {
    pub fn new(query: &'a str, session_id: Option<&'a str>) -> Self {
        Self {
            query,
            session_id,
            namespace: NAMESPACE,
        }
    }
}

/// A citation pointing at a retrieval-corpus passage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub source: String,
    pub chunk_id: String,
    /// Per-source keys beyond `source` and `chunk_id` (scores, titles, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Source {
    pub fn new(source: impl Into<String>, chunk_id: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            chunk_id: chunk_id.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Server → client: chat answer.
///
/// Fields the server sends beyond the known ones are kept in `extra`, so
/// re-serializing yields the body as it was received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub answer: String,
    /// `None` when the key was absent, `Some(None)` when it was `null`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present"
    )]
    pub sources: Option<Option<Vec<Source>>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ChatResponse {
    /// Cited sources, empty when the server sent none.
    pub fn sources(&self) -> &[Source] {
        self.sources.as_ref().and_then(|s| s.as_deref()).unwrap_or(&[])
    }
}

/// Marks a key that was present, keeping a `null` value as `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}
