//! Runtime configuration loaded from `config.yaml`.
//!
//! The file lives at `--config` or `<config dir>/news_aggregator/config.yaml`.
//! A missing file yields defaults; every API key can also come from the CLI or
//! the environment (see [`crate::cli::Cli`]).

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

pub const APP_DIR: &str = "news_aggregator";

pub const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";
pub const GUARDIAN_BASE_URL: &str = "https://content.guardianapis.com";
pub const NYT_BASE_URL: &str = "https://api.nytimes.com/svc";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub newsapi_key: Option<String>,
    pub guardian_key: Option<String>,
    pub nyt_key: Option<String>,
    pub newsapi_base_url: String,
    pub guardian_base_url: String,
    pub nyt_base_url: String,
    /// Per-request timeout for every provider call.
    pub timeout_secs: u64,
    pub user_agent: String,
    pub page_size: u32,
    /// Where preferences are persisted; defaults under the config dir.
    pub storage_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            newsapi_key: None,
            guardian_key: None,
            nyt_key: None,
            newsapi_base_url: NEWSAPI_BASE_URL.to_string(),
            guardian_base_url: GUARDIAN_BASE_URL.to_string(),
            nyt_base_url: NYT_BASE_URL.to_string(),
            timeout_secs: 15,
            user_agent: format!("{}/{}", APP_DIR, env!("CARGO_PKG_VERSION")),
            page_size: 10,
            storage_path: None,
        }
    }
}

impl Config {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Resolved preference storage file.
    pub fn storage_file(&self) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(|| app_dir().join("storage.json"))
    }
}

/// `<platform config dir>/news_aggregator`, or the working directory when the
/// platform has none.
pub fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Load configuration from `path`, or from the default location.
///
/// A missing file is not an error; a malformed one is.
#[instrument(level = "info", skip_all)]
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| app_dir().join("config.yaml"));

    if !path.exists() {
        debug!(path = %path.display(), "No config file; using defaults");
        return Ok(Config::default());
    }

    let raw = std::fs::read_to_string(&path)?;
    let config: Config = serde_yaml::from_str(&raw)?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}
