use crate::api::groq::DEFAULT_MODEL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use std::{env, fs};
use tracing::{debug, info};

/// Application configuration, read once at startup from an optional
/// `config.toml` (path overridable via `SMARTPLATE_CONFIG`). Every field has
/// a default, so a missing file is not an error; a present-but-broken file is.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database file. `SMARTPLATE_DB` overrides whatever is configured.
    pub database_path: String,
    /// Client-side timeout for both external services, in seconds.
    pub http_timeout_secs: u64,
    /// Chat completion model name.
    pub chat_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "smartplate.db".to_string(),
            http_timeout_secs: 15,
            chat_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl AppConfig {
    #[must_use]
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

pub fn load_app_configuration() -> Result<AppConfig> {
    let path = env::var("SMARTPLATE_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

    let mut config = if fs::metadata(&path).is_ok() {
        let contents = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config file {}: {}", path, e)))?;
        let config: AppConfig = toml::from_str(&contents).map_err(|e| {
            Error::Config(format!("Failed to parse TOML from config file {}: {}", path, e))
        })?;
        info!("Loaded configuration from {}", path);
        config
    } else {
        debug!("No config file at {}; using defaults", path);
        AppConfig::default()
    };

    if let Ok(db_path) = env::var("SMARTPLATE_DB") {
        config.database_path = db_path;
    }
    Ok(config)
}

/// Where the persisted settings record lives: `SMARTPLATE_SETTINGS` if set,
/// otherwise `.smartplate_settings.json` in the home directory (falling back
/// to the working directory when `HOME` is unset).
#[must_use]
pub fn settings_path() -> PathBuf {
    if let Ok(path) = env::var("SMARTPLATE_SETTINGS") {
        return PathBuf::from(path);
    }
    let mut base = env::var("HOME").map_or_else(|_| PathBuf::from("."), PathBuf::from);
    base.push(".smartplate_settings.json");
    base
}
