//! Internationalization support for the Zettel bot.
//!
//! Message catalogs are Fluent files compiled into the binary; see
//! `locales/<code>/bot.ftl`.

pub mod bundle;
pub mod error;
pub mod locale;
pub mod manager;

pub use bundle::BundleManager;
pub use error::{I18nError, I18nResult};
pub use fluent_bundle::FluentArgs;
pub use locale::Locale;
pub use manager::I18nManager;
