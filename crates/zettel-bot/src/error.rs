//! Application-wide error types using thiserror.

use zettel_common::ZettelError;

/// Main application error type.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Error from one of the library crates.
    #[error(transparent)]
    Zettel(#[from] ZettelError),

    /// Settings that load but cannot run the bot.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] validator::ValidationErrors),

    /// Unsupported value of `telegram.language`.
    #[error("Unsupported language: {0}")]
    Language(String),

    /// Localization catalogs failed to load.
    #[error("Localization error: {0}")]
    I18n(#[from] zettel_i18n::I18nError),

    /// The Bot API refused a request that cannot succeed on retry.
    #[error("Telegram rejected the bot: {0}")]
    Rejected(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the bot application.
pub type BotResult<T> = Result<T, BotError>;
