//! # Zettel Commands
//!
//! Chat command handling for the Zettel bot, independent of the transport.
//!
//! The [`Dispatcher`] turns [`IncomingUpdate`]s into note operations and
//! replies through a [`BotApi`] implementation. Reply keyboards, inline
//! callback payloads and the note creation wizard live here too.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod callback;
pub mod command;
pub mod dispatcher;
pub mod keyboard;
pub mod state;
pub mod update;
pub mod views;

pub use api::{
    BotApi, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, MessageEdit, OutgoingMessage, ParseMode,
    ReplyKeyboardMarkup, ReplyMarkup,
};
pub use callback::CallbackAction;
pub use command::Command;
pub use dispatcher::Dispatcher;
pub use keyboard::MenuButton;
pub use state::{DialogueState, DialogueStore};
pub use update::{IncomingCallback, IncomingMessage, IncomingUpdate};
