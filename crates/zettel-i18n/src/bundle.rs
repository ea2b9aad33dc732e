//! FluentBundle management and message formatting

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource};
use tracing::{debug, error, warn};

use crate::error::{I18nError, I18nResult};
use crate::Locale;

/// Holds one concurrent `FluentBundle` per locale
pub struct BundleManager {
    bundles: HashMap<Locale, FluentBundle<FluentResource>>,
}

impl std::fmt::Debug for BundleManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleManager")
            .field("locales", &self.bundles.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for BundleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BundleManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self {
            bundles: HashMap::new(),
        }
    }

    /// Parse `source` and add it to the locale's bundle
    pub fn add_resource(&mut self, locale: Locale, source: &str) -> I18nResult<()> {
        let resource = FluentResource::try_new(source.to_string()).map_err(|(_, errors)| {
            let errors: Vec<String> = errors.iter().map(|e| format!("{e:?}")).collect();
            error!(%locale, ?errors, "Fluent resource failed to parse");
            I18nError::FluentParseError {
                locale: locale.code().to_string(),
                errors,
            }
        })?;

        let bundle = match self.bundles.entry(locale) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let mut bundle = FluentBundle::new_concurrent(vec![locale.to_language_identifier()?]);
                // Telegram renders the bidi isolation marks literally
                bundle.set_use_isolating(false);
                entry.insert(bundle)
            }
        };

        bundle.add_resource(resource).map_err(|errors| I18nError::FluentParseError {
            locale: locale.code().to_string(),
            errors: errors.iter().map(|e| format!("{e:?}")).collect(),
        })?;

        debug!(%locale, "Added resource to bundle");
        Ok(())
    }

    /// Format a message with the given arguments
    pub fn format_message(
        &self,
        locale: Locale,
        message_id: &str,
        args: Option<&FluentArgs<'_>>,
    ) -> I18nResult<String> {
        let not_found = || I18nError::MessageNotFound {
            key: message_id.to_string(),
        };

        let bundle = self.bundles.get(&locale).ok_or_else(not_found)?;
        let message = bundle.get_message(message_id).ok_or_else(not_found)?;
        let pattern = message.value().ok_or_else(not_found)?;

        let mut errors = Vec::new();
        let formatted = bundle.format_pattern(pattern, args, &mut errors);

        if !errors.is_empty() {
            let errors: Vec<String> = errors.iter().map(|e| format!("{e:?}")).collect();
            warn!(message_id, ?errors, "Formatting errors");
            return Err(I18nError::MessageFormatError {
                key: message_id.to_string(),
                errors,
            });
        }

        Ok(formatted.into_owned())
    }

    /// Check if a message exists in the locale's bundle
    pub fn has_message(&self, locale: Locale, message_id: &str) -> bool {
        self.bundles
            .get(&locale)
            .is_some_and(|bundle| bundle.has_message(message_id))
    }

    /// Locales with at least one resource loaded
    pub fn available_locales(&self) -> Vec<Locale> {
        self.bundles.keys().copied().collect()
    }
}

/// Build `FluentArgs` from `key => value` pairs
#[macro_export]
macro_rules! fluent_args {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut args = $crate::FluentArgs::new();
        $(
            args.set($key, $value);
        )*
        args
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_args() {
        let mut manager = BundleManager::new();
        manager
            .add_resource(Locale::English, "greeting = Hello, { $name }!")
            .unwrap();

        let args = crate::fluent_args!["name" => "Ada"];
        let text = manager
            .format_message(Locale::English, "greeting", Some(&args))
            .unwrap();
        assert_eq!(text, "Hello, Ada!");
    }

    #[test]
    fn test_missing_message() {
        let mut manager = BundleManager::new();
        manager.add_resource(Locale::English, "a = A").unwrap();

        assert!(manager.has_message(Locale::English, "a"));
        assert!(!manager.has_message(Locale::Russian, "a"));
        assert!(matches!(
            manager.format_message(Locale::English, "b", None),
            Err(I18nError::MessageNotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_resource() {
        let mut manager = BundleManager::new();
        let result = manager.add_resource(Locale::English, "= no identifier");
        assert!(matches!(result, Err(I18nError::FluentParseError { .. })));
    }

    #[test]
    fn test_duplicate_message_is_rejected() {
        let mut manager = BundleManager::new();
        manager.add_resource(Locale::English, "a = first").unwrap();
        assert!(manager.add_resource(Locale::English, "a = second").is_err());
    }
}
