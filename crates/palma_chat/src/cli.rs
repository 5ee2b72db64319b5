//! Command-line arguments for `palma-chat`.

use clap::Parser;
use palma_client::config::{self, CONFIG_ENV};
use palma_client::{Config, ConfigError, Overrides, Settings};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "palma-chat", version, about = "Ask the Palma help assistant from the terminal")]
pub struct Cli {
    /// Config file (default: ~/.palma/config.yaml)
    #[arg(long, env = CONFIG_ENV, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Where the session id is kept between runs
    #[arg(long, value_name = "PATH")]
    pub session_file: Option<PathBuf>,

    /// Forget the stored session before sending anything
    #[arg(long)]
    pub new_session: bool,

    /// Write the resolved settings to the config file and exit
    #[arg(long)]
    pub save_config: bool,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Ask one question and exit; without it, questions are read from stdin
    pub question: Option<String>,
}

impl Cli {
    /// Environment overrides plus `--session-file`.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            session_file: self.session_file.clone(),
            ..Overrides::from_env()
        }
    }

    /// Load config and resolve startup settings. Any error here is fatal.
    /// With `--save-config` an explicit config path may not exist yet.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let cfg = match &self.config {
            Some(path) if self.save_config && !path.exists() => Config::default(),
            path => config::load_from(path.as_deref())?,
        };
        Settings::resolve(&cfg, &self.overrides())
    }

    /// File `--save-config` writes to: `--config`/`PALMA_CONFIG`, else the default.
    pub fn config_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config::default_config_path().ok_or(ConfigError::NoHomeDir),
        }
    }
}
