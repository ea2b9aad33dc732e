//! Application configuration structures

use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};
use zettel_common::LoggingConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// Telegram Bot API access
    pub telegram: TelegramConfig,

    /// Notes database
    pub database: DatabaseConfig,

    /// Graph image rendering settings
    pub graph: GraphConfig,

    /// Users HTTP service
    pub api: ApiConfig,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from @BotFather; only the bot binary requires it
    pub token: String,

    /// Base URL of the Bot API server
    #[validate(length(min = 1, message = "Telegram API URL cannot be empty"))]
    pub api_url: String,

    /// Long-poll timeout passed to `getUpdates`
    #[validate(range(min = 1, max = 50, message = "Poll timeout must be between 1 and 50 seconds"))]
    pub poll_timeout_seconds: u64,

    /// HTTP request timeout; must be longer than the poll timeout
    #[validate(range(min = 5, max = 300, message = "Timeout must be between 5 and 300 seconds"))]
    pub request_timeout_seconds: u64,

    /// Language of the bot's messages
    #[validate(custom(function = "crate::validation::validate_language", message = "Language must be one of: ru-RU, en-US"))]
    pub language: String,
}

/// Notes database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file holding the `notes` and `note_links` tables
    #[validate(custom(function = "crate::validation::validate_file_path", message = "Database path is invalid"))]
    pub path: String,

    /// Maximum pooled connections
    #[validate(range(min = 1, max = 32, message = "Max connections must be between 1 and 32"))]
    pub max_connections: u32,
}

/// Graph image configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GraphConfig {
    /// Image width in pixels
    #[validate(range(min = 400, max = 4000, message = "Width must be between 400 and 4000 pixels"))]
    pub width: u32,

    /// Image height in pixels
    #[validate(range(min = 300, max = 4000, message = "Height must be between 300 and 4000 pixels"))]
    pub height: u32,

    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Background color must be valid hex color"))]
    pub background_color: String,

    /// Fill of notes that have at least one link
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Connected color must be valid hex color"))]
    pub connected_color: String,

    /// Fill of notes without links
    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Isolated color must be valid hex color"))]
    pub isolated_color: String,

    #[validate(regex(path = "crate::validation::HEX_COLOR_REGEX", message = "Edge color must be valid hex color"))]
    pub edge_color: String,

    #[validate(length(min = 1, message = "Font family cannot be empty"))]
    pub font_family: String,

    #[validate(range(min = 8, max = 72, message = "Font size must be between 8 and 72"))]
    pub font_size: u32,

    /// Iterations of the force-directed layout
    #[validate(range(min = 10, max = 5000, message = "Layout iterations must be between 10 and 5000"))]
    pub layout_iterations: u32,

    /// Seed of the layout's initial positions; same seed, same picture
    pub layout_seed: u64,

    /// Legend lines listing number and title; 0 disables the legend
    #[validate(range(max = 100, message = "Legend cannot list more than 100 entries"))]
    pub max_legend_entries: usize,
}

/// Users HTTP service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ApiConfig {
    #[validate(custom(function = "crate::validation::validate_bind_address", message = "Bind address must be host:port"))]
    pub bind_address: String,

    /// SQLite file holding the `users` table
    #[validate(custom(function = "crate::validation::validate_file_path", message = "Users database path is invalid"))]
    pub database_path: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    #[validate(custom(function = "crate::validation::validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Write logs to this file instead of stdout
    pub file: Option<String>,

    /// Emit JSON lines
    pub json: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_url: "https://api.telegram.org".to_string(),
            poll_timeout_seconds: 30,
            request_timeout_seconds: 60,
            language: "ru-RU".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "zettelkasten.db".to_string(),
            max_connections: 5,
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            background_color: "#FFFFFF".to_string(),
            connected_color: "#4169E1".to_string(),
            isolated_color: "#FF6B6B".to_string(),
            edge_color: "#9E9E9E".to_string(),
            font_family: "sans-serif".to_string(),
            font_size: 16,
            layout_iterations: 300,
            layout_seed: 42,
            max_legend_entries: 30,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
            database_path: "users.db".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json: false,
        }
    }
}

impl Config {
    /// Validate every section plus the rules that span several fields
    pub fn validate_all(&self) -> Result<(), ValidationErrors> {
        self.telegram.validate()?;
        self.database.validate()?;
        self.graph.validate()?;
        self.api.validate()?;
        self.logging.validate()?;

        if self.telegram.request_timeout_seconds <= self.telegram.poll_timeout_seconds {
            let mut errors = ValidationErrors::new();
            let mut error = ValidationError::new("request_timeout_not_above_poll_timeout");
            error.message = Some("Request timeout must be longer than the poll timeout".into());
            errors.add("request_timeout_seconds", error);
            return Err(errors);
        }

        Ok(())
    }

    /// `validate_all` plus the checks only the bot binary needs
    pub fn validate_for_bot(&self) -> Result<(), ValidationErrors> {
        self.validate_all()?;

        if let Err(mut error) = crate::validation::validate_telegram_token(&self.telegram.token) {
            error.message = Some("Telegram bot token is missing or malformed".into());
            let mut errors = ValidationErrors::new();
            errors.add("token", error);
            return Err(errors);
        }

        Ok(())
    }
}

impl TelegramConfig {
    /// Long-poll timeout as a `Duration`
    pub const fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_seconds)
    }

    /// HTTP request timeout as a `Duration`
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl LoggingSettings {
    /// Translate into the logging setup understood by `zettel_common::init_logging`
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            json_format: self.json,
            file_path: self.file.clone(),
            ..LoggingConfig::default()
        }
    }
}
