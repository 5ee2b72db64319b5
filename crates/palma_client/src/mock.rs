//! Offline backend returning a canned answer after a simulated delay.

use async_trait::async_trait;
use std::time::Duration;

use crate::client::{ChatBackend, ChatError};
use crate::messages::{ChatResponse, Source};

/// Simulated network latency for mock replies.
pub const MOCK_LATENCY: Duration = Duration::from_millis(600);

/// Session id handed out when the caller has none yet.
pub const FALLBACK_SESSION_ID: &str = "cc2f430a-8e08-460a-b21f-e3eab4344b6b";

const MOCK_ANSWER: &str = "Modular Management provides the following services:\n\n\
1. Consulting Services - Helping clients create and implement modular products and configurable product architectures to accelerate value creation, improve quality and cost, serve a wider market, and offer leading performance and technology.\n\n\
2. Expert Services - Specialized support to enhance modularity and product configuration efforts.\n\n\
3. Academy - Training and educational programs related to modularity and configurable product architectures.\n\n\
These services aim to support clients ranging from one-of-a-kind project-driven products to high-volume consumer businesses, whether they are new to modularity or already experienced.";

const MOCK_SOURCES: [(&str, &str); 6] = [
    (
        "https://www.modularmanagement.com/solutions/consulting",
        "https://www.modularmanagement.com/solutions/consulting::chunk-909",
    ),
    (
        "https://www.modularmanagement.com/blog/tag/product-configuration",
        "https://www.modularmanagement.com/blog/tag/product-configuration::chunk-1113",
    ),
    (
        "https://www.modularmanagement.com/blog/tag/composability",
        "https://www.modularmanagement.com/blog/tag/composability::chunk-1147",
    ),
    (
        "https://www.modularmanagement.com/blog/tag/modular-design",
        "https://www.modularmanagement.com/blog/tag/modular-design::chunk-1166",
    ),
    (
        "https://www.modularmanagement.com/blog/components-successful-cpq-system",
        "https://www.modularmanagement.com/blog/components-successful-cpq-system::chunk-418",
    ),
    (
        "https://www.modularmanagement.com/",
        "https://www.modularmanagement.com/::chunk-0",
    ),
];

/// The canned payload, carrying [`FALLBACK_SESSION_ID`].
pub fn mock_chat_response() -> ChatResponse {
    ChatResponse {
        session_id: FALLBACK_SESSION_ID.to_string(),
        answer: MOCK_ANSWER.to_string(),
        sources: Some(Some(
            MOCK_SOURCES
                .iter()
                .map(|(source, chunk_id)| Source::new(*source, *chunk_id))
                .collect(),
        )),
        extra: serde_json::Map::new(),
    }
}

/// Backend that never touches the network.
#[derive(Debug, Clone)]
pub struct MockBackend {
    latency: Duration,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            latency: MOCK_LATENCY,
        }
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn send_chat_message(
        &self,
        _query: &str,
        session_id: Option<&str>,
    ) -> Result<ChatResponse, ChatError> {
        tokio::time::sleep(self.latency).await;

        let mut response = mock_chat_response();
        if let Some(id) = session_id {
            response.session_id = id.to_string();
        }
        Ok(response)
    }
}
