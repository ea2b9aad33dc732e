//! Internationalization manager

use tracing::{info, warn};

use crate::bundle::BundleManager;
use crate::error::{I18nError, I18nResult};
use crate::{FluentArgs, Locale};

/// Formats the bot's messages, falling back to the default locale
#[derive(Debug)]
pub struct I18nManager {
    default_locale: Locale,
    bundles: BundleManager,
}

impl I18nManager {
    /// Load the embedded catalogs of every supported locale
    pub fn new(default_locale: Locale) -> I18nResult<Self> {
        let mut bundles = BundleManager::new();
        for locale in Locale::all() {
            bundles.add_resource(locale, locale.embedded_resource())?;
        }

        info!(%default_locale, "I18nManager initialized");
        Ok(Self {
            default_locale,
            bundles,
        })
    }

    /// Get a localized message
    pub fn get_message(
        &self,
        key: &str,
        locale: Locale,
        args: Option<&FluentArgs<'_>>,
    ) -> I18nResult<String> {
        if self.bundles.has_message(locale, key) {
            return self.bundles.format_message(locale, key, args);
        }

        if locale != self.default_locale && self.bundles.has_message(self.default_locale, key) {
            warn!(
                key,
                %locale,
                default_locale = %self.default_locale,
                "Message missing, falling back to default locale"
            );
            return self.bundles.format_message(self.default_locale, key, args);
        }

        Err(I18nError::MessageNotFound {
            key: key.to_string(),
        })
    }

    /// Message without arguments; the key itself when formatting fails
    pub fn text(&self, key: &str, locale: Locale) -> String {
        self.lookup(key, locale, None)
    }

    /// Message with arguments; the key itself when formatting fails
    pub fn text_with(&self, key: &str, locale: Locale, args: &FluentArgs<'_>) -> String {
        self.lookup(key, locale, Some(args))
    }

    fn lookup(&self, key: &str, locale: Locale, args: Option<&FluentArgs<'_>>) -> String {
        self.get_message(key, locale, args).unwrap_or_else(|e| {
            warn!(key, %locale, error = %e, "Using message key as text");
            key.to_string()
        })
    }

    /// Check if a message exists for the given locale or the default one
    pub fn has_message(&self, key: &str, locale: Locale) -> bool {
        self.bundles.has_message(locale, key)
            || (locale != self.default_locale && self.bundles.has_message(self.default_locale, key))
    }

    /// Get the default locale
    pub const fn default_locale(&self) -> Locale {
        self.default_locale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluent_args;

    #[test]
    fn test_loads_both_locales() {
        let manager = I18nManager::new(Locale::Russian).unwrap();
        assert_eq!(manager.text("btn-cancel", Locale::Russian), "❌ Отмена");
        assert_eq!(manager.text("btn-cancel", Locale::English), "❌ Cancel");
    }

    #[test]
    fn test_arguments_are_substituted() {
        let manager = I18nManager::new(Locale::Russian).unwrap();
        let args = fluent_args!["id" => 7];
        let text = manager.text_with("note-created", Locale::Russian, &args);
        assert!(text.starts_with("✅ Заметка успешно создана! (ID: 7)"));
    }

    #[test]
    fn test_multiline_messages_keep_blank_lines() {
        let manager = I18nManager::new(Locale::English).unwrap();
        let text = manager.text("new-note-title-prompt", Locale::English);
        assert_eq!(text, "📝 New note\n\nEnter the note title:");
    }

    #[test]
    fn test_unknown_key_falls_back_to_key() {
        let manager = I18nManager::new(Locale::Russian).unwrap();
        assert_eq!(manager.text("no-such-key", Locale::English), "no-such-key");
        assert!(!manager.has_message("no-such-key", Locale::English));
        assert!(manager.get_message("no-such-key", Locale::English, None).is_err());
    }
}
