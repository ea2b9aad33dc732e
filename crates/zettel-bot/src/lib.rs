//! # Zettel Bot
//!
//! Telegram front end of the Zettelkasten note bot.
//!
//! This crate owns the Bot API transport and the long-polling loop; the
//! command handling itself lives in `zettel-commands`.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod bot;
pub mod error;
pub mod inspect;
pub mod telegram;
pub mod types;

pub use bot::ZettelBot;
pub use error::{BotError, BotResult};
pub use telegram::TelegramClient;
