//! Validation utilities and regex patterns

use regex::Regex;
use std::sync::LazyLock;
use validator::ValidationError;

/// Regex pattern for validating hex color codes (e.g., #FFFFFF, #FF0000)
pub static HEX_COLOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid hex color regex pattern")
});

/// Bot tokens issued by @BotFather look like `123456789:AA...`
static TELEGRAM_TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{3,}:[A-Za-z0-9_-]{20,}$").expect("Invalid telegram token regex pattern")
});

/// Languages the bot ships message catalogs for
pub const SUPPORTED_LANGUAGES: &[&str] = &["ru-RU", "en-US"];

/// Validate Telegram bot token format
pub fn validate_telegram_token(token: &str) -> Result<(), ValidationError> {
    if token.is_empty() {
        return Err(ValidationError::new("empty_telegram_token"));
    }

    if TELEGRAM_TOKEN_REGEX.is_match(token) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_telegram_token_format"))
    }
}

/// Validate log level string
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    match level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_level")),
    }
}

/// Validate that a message catalog exists for the language tag
pub fn validate_language(language: &str) -> Result<(), ValidationError> {
    if SUPPORTED_LANGUAGES.contains(&language) {
        Ok(())
    } else {
        Err(ValidationError::new("unsupported_language"))
    }
}

/// Validate a `host:port` bind address
pub fn validate_bind_address(address: &str) -> Result<(), ValidationError> {
    match address.parse::<std::net::SocketAddr>() {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("invalid_bind_address")),
    }
}

/// Validate file path (basic check for valid path characters)
pub fn validate_file_path(path: &str) -> Result<(), ValidationError> {
    if path.trim().is_empty() {
        return Err(ValidationError::new("empty_file_path"));
    }

    if path.contains('\0') {
        return Err(ValidationError::new("invalid_file_path_characters"));
    }

    Ok(())
}
