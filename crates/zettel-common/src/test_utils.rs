//! Test utilities shared by the crates of the workspace.
//!
//! Enabled for this crate's own tests and, for other crates, through the
//! `testing` feature.

use std::path::PathBuf;
use std::sync::Once;

use chrono::{NaiveDate, NaiveDateTime};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        // another harness may already have installed a subscriber
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// A scratch SQLite file inside a directory that is removed on drop.
pub struct TempDatabase {
    /// Keeps the directory alive for as long as the database is used
    pub dir: tempfile::TempDir,
    /// Path of the (not yet created) database file
    pub path: PathBuf,
}

/// Create a fresh path for a SQLite database file.
pub fn temp_database(file_name: &str) -> TempDatabase {
    let dir = tempfile::tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join(file_name);
    TempDatabase { dir, path }
}

/// Fixed timestamp for deterministic assertions.
pub fn fixed_datetime(year: i32, month: u32, day: u32, hour: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, min, 0))
        .expect("Invalid fixture date")
}

/// Note fixtures used by store, graph and dispatcher tests.
pub mod note_fixtures {
    /// `(title, content, tags)` triples covering Cyrillic text and empty tags.
    pub fn sample_notes() -> Vec<(&'static str, &'static str, Option<&'static str>)> {
        vec![
            ("Zettelkasten", "A method of atomic, linked notes", Some("method, notes")),
            ("Atomic notes", "One idea per note", Some("notes")),
            ("Связи", "Заметки связаны друг с другом", None),
            ("Rust ownership", "Borrowing rules for references", Some("rust")),
        ]
    }
}
