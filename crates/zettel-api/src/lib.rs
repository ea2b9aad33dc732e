//! # Zettel API
//!
//! Small HTTP service that stores the Telegram users of the bot in their
//! own SQLite database. It shares configuration and logging with the bot
//! but not the notes database.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod models;
pub mod repository;
pub mod routes;

pub use error::ApiError;
pub use repository::UserRepository;
pub use routes::{build_router, AppState};
