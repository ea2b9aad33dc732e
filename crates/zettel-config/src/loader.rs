//! Configuration loading utilities

use std::env;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;
use zettel_common::Result as ZettelResult;

use crate::Config;

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "ZETTEL_CONFIG_PATH";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for zettel_common::ZettelError {
    fn from(err: ConfigError) -> Self {
        zettel_common::ZettelError::config_with_source("Failed to load configuration", err)
    }
}

/// Configuration loader for both binaries
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        debug!(path = %path.as_ref().display(), "Reading configuration file");
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from `ZETTEL_CONFIG_PATH`, `config.yaml`, `config.yml`
    /// or built-in defaults, in that order
    pub fn load() -> ZettelResult<Config> {
        let config = if let Ok(config_path) = env::var(CONFIG_PATH_ENV) {
            Self::load_config(&config_path)?
        } else if Path::new("config.yaml").exists() {
            Self::load_config("config.yaml")?
        } else if Path::new("config.yml").exists() {
            Self::load_config("config.yml")?
        } else {
            debug!("No configuration file found, using defaults");
            Self::defaults_with_env()?
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ZettelResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Built-in defaults with environment overrides applied
    pub fn defaults_with_env() -> Result<Config, ConfigError> {
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        // Telegram configuration overrides
        if let Ok(token) = env::var("TELEGRAM_BOT_TOKEN") {
            config.telegram.token = token;
        }

        if let Ok(url) = env::var("TELEGRAM_API_URL") {
            config.telegram.api_url = url;
        }

        if let Some(timeout) = parse_env("TELEGRAM_POLL_TIMEOUT")? {
            config.telegram.poll_timeout_seconds = timeout;
        }

        if let Ok(language) = env::var("BOT_LANGUAGE") {
            config.telegram.language = language;
        }

        // Storage overrides
        if let Ok(path) = env::var("ZETTEL_DB_PATH") {
            config.database.path = path;
        }

        if let Ok(path) = env::var("USERS_DB_PATH") {
            config.api.database_path = path;
        }

        if let Ok(address) = env::var("API_BIND_ADDRESS") {
            config.api.bind_address = address;
        }

        // Graph configuration overrides
        if let Some(width) = parse_env("GRAPH_WIDTH")? {
            config.graph.width = width;
        }

        if let Some(height) = parse_env("GRAPH_HEIGHT")? {
            config.graph.height = height;
        }

        // Logging overrides
        if let Ok(level) = env::var("LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(file) = env::var("LOG_FILE") {
            config.logging.file = Some(file).filter(|f| !f.is_empty());
        }

        if let Some(json) = parse_env("LOG_JSON")? {
            config.logging.json = json;
        }

        Ok(())
    }
}

fn parse_env<T>(var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ConfigError::EnvParseError {
                var: var.to_string(),
                source: Box::new(e),
            }),
        Err(_) => Ok(None),
    }
}
