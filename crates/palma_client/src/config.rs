//! Client config load/save for `~/.palma/config.yaml`, plus environment
//! overrides and the resolved [`Settings`] the client starts from.

use reqwest::Url;
use std::path::{Path, PathBuf};

/// Env var naming an explicit config file.
pub const CONFIG_ENV: &str = "PALMA_CONFIG";
/// Env var overriding `api.base_url`.
pub const BASE_URL_ENV: &str = "PALMA_API_BASE_URL";
/// Env var overriding `api.use_mock`; only the exact value `true` enables mock mode.
pub const USE_MOCK_ENV: &str = "PALMA_USE_CHAT_MOCK";

/// API section (base_url, use_mock).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ApiSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_mock: Option<bool>,
}

/// Session section (where the session id is persisted).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SessionSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Full config file.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub session: SessionSection,
}

/// Values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    /// Raw env value; compared against `"true"`.
    pub use_mock: Option<String>,
    pub session_file: Option<PathBuf>,
}

impl Overrides {
    /// Read `PALMA_API_BASE_URL` and `PALMA_USE_CHAT_MOCK`.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var(BASE_URL_ENV).ok(),
            use_mock: std::env::var(USE_MOCK_ENV).ok(),
            session_file: None,
        }
    }
}

/// Resolved startup settings. Always carries a usable base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub base_url: Url,
    pub use_mock: bool,
    pub session_file: PathBuf,
}

impl Settings {
    /// Merge file values with overrides. Fails fast when no base URL is
    /// configured, in mock mode too.
    pub fn resolve(config: &Config, overrides: &Overrides) -> Result<Self, ConfigError> {
        let raw_url = overrides
            .base_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .or(config.api.base_url.as_deref())
            .ok_or(ConfigError::MissingBaseUrl)?;
        let base_url = parse_base_url(raw_url)?;

        let use_mock = match overrides.use_mock.as_deref() {
            Some(value) => value == "true",
            None => config.api.use_mock.unwrap_or(false),
        };

        let session_file = match (&overrides.session_file, &config.session.file) {
            (Some(path), _) => path.clone(),
            (None, Some(path)) => PathBuf::from(path),
            (None, None) => default_session_path().ok_or(ConfigError::NoHomeDir)?,
        };

        Ok(Self {
            base_url,
            use_mock,
            session_file,
        })
    }
}

impl From<&Settings> for Config {
    fn from(s: &Settings) -> Self {
        Config {
            api: ApiSection {
                base_url: Some(s.base_url.to_string()),
                use_mock: Some(s.use_mock),
            },
            session: SessionSection {
                file: Some(s.session_file.display().to_string()),
            },
        }
    }
}

/// Validate a base URL: non-blank, absolute, http or https.
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingBaseUrl);
    }
    let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidBaseUrl {
        value: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidBaseUrl {
            value: trimmed.to_string(),
            reason: format!("unsupported scheme `{}`", other),
        }),
    }
}

/// Returns the default config file path: `~/.palma/config.yaml` (platform-specific).
pub fn default_config_path() -> Option<PathBuf> {
    Some(palma_dir()?.join("config.yaml"))
}

/// Returns the default session file path: `~/.palma/session.yaml`.
pub fn default_session_path() -> Option<PathBuf> {
    Some(palma_dir()?.join("session.yaml"))
}

fn palma_dir() -> Option<PathBuf> {
    Some(home_dir()?.join(".palma"))
}

#[cfg(unix)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

#[cfg(windows)]
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("USERPROFILE").map(PathBuf::from)
}

#[cfg(not(any(unix, windows)))]
fn home_dir() -> Option<PathBuf> {
    None
}

/// Load config from a YAML file. The file must exist.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load the config the process should start from.
///
/// An explicit path (argument, then `PALMA_CONFIG`) must exist. The default
/// `~/.palma/config.yaml` is optional; without it the config is empty and
/// everything comes from the environment.
pub fn load_from(override_path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = override_path {
        return load(path);
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return load(Path::new(&path));
    }
    match default_config_path() {
        Some(path) if path.exists() => load(&path),
        _ => Ok(Config::default()),
    }
}

/// Save config to a YAML file. Creates parent directory if missing.
pub fn save(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let io_err = |e: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let contents = serde_yaml::to_string(config).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::write(path, contents).map_err(io_err)
}

/// Startup configuration error. Fatal: the client is never built.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("API base URL is not defined (set api.base_url or PALMA_API_BASE_URL)")]
    MissingBaseUrl,
    #[error("invalid API base URL `{value}`: {reason}")]
    InvalidBaseUrl { value: String, reason: String },
    #[error("unable to determine home directory for default paths")]
    NoHomeDir,
}
