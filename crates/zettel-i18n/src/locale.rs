//! Supported locales

use crate::error::{I18nError, I18nResult};
use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

/// Supported locales
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Locale {
    #[default]
    Russian,
    English,
}

impl Locale {
    /// Get the language code for this locale
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Russian => "ru-RU",
            Self::English => "en-US",
        }
    }

    /// Parse a locale from a language code
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ru" | "ru-RU" => Some(Self::Russian),
            "en" | "en-US" => Some(Self::English),
            _ => None,
        }
    }

    /// Convert to Fluent LanguageIdentifier
    pub fn to_language_identifier(&self) -> I18nResult<LanguageIdentifier> {
        self.code()
            .parse()
            .map_err(|_| I18nError::InvalidLanguageId(self.code().to_string()))
    }

    /// Get all supported locales
    pub const fn all() -> [Self; 2] {
        [Self::Russian, Self::English]
    }

    /// The Fluent source compiled into the binary
    pub const fn embedded_resource(&self) -> &'static str {
        match self {
            Self::Russian => include_str!("../locales/ru-RU/bot.ftl"),
            Self::English => include_str!("../locales/en-US/bot.ftl"),
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
