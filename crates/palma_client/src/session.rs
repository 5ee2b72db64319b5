//! Session id persistence. The id is opaque: stored and replayed, never parsed.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Key the session id is stored under.
pub const SESSION_KEY: &str = "session_id";

/// Durable home for the latest session id.
pub trait SessionStore {
    fn load(&self) -> Result<Option<String>, SessionError>;
    fn save(&mut self, session_id: &str) -> Result<(), SessionError>;
    fn clear(&mut self) -> Result<(), SessionError>;
}

/// YAML key/value file, e.g. `~/.palma/session.yaml`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, SessionError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_yaml::from_str(&contents).map_err(|e| SessionError::Parse {
            path: self.path.clone(),
            source: e,
        })
    }

    fn io_error(&self, source: std::io::Error) -> SessionError {
        SessionError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.read_entries()?.remove(SESSION_KEY))
    }

    fn save(&mut self, session_id: &str) -> Result<(), SessionError> {
        let mut entries = self.read_entries()?;
        entries.insert(SESSION_KEY.to_string(), session_id.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        let contents = serde_yaml::to_string(&entries).map_err(|e| SessionError::Parse {
            path: self.path.clone(),
            source: e,
        })?;
        std::fs::write(&self.path, contents).map_err(|e| self.io_error(e))
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-process store; forgets everything on exit.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    session_id: Option<String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>, SessionError> {
        Ok(self.session_id.clone())
    }

    fn save(&mut self, session_id: &str) -> Result<(), SessionError> {
        self.session_id = Some(session_id.to_string());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        self.session_id = None;
        Ok(())
    }
}

/// Session store error.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session store I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt session store {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
