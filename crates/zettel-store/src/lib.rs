//! Storage of notes and the undirected links between them.
//!
//! The schema is the one the bot has always used (`notes` and
//! `note_links`), so existing database files open unchanged.

pub mod models;
pub mod notes;
mod schema;

pub use models::{GraphData, LinkOutcome, LinkedNote, NewNote, Note, NoteLink, NoteSummary};
pub use notes::NoteStore;
