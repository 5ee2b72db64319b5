//! Palma chat session client (config, `/chat` wire types, live and mock backends,
//! session persistence). Used by the terminal chat panel.

pub mod client;
pub mod config;
pub mod logging;
pub mod messages;
pub mod mock;
pub mod session;

pub use client::{ChatBackend, ChatClient, ChatError, LiveBackend};
pub use config::{default_config_path, Config, ConfigError, Overrides, Settings};
pub use messages::{ChatRequest, ChatResponse, Source, NAMESPACE};
pub use mock::{MockBackend, FALLBACK_SESSION_ID, MOCK_LATENCY};
pub use session::{FileSessionStore, MemorySessionStore, SessionError, SessionStore};
