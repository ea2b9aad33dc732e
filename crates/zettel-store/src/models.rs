//! Rows and query results of the notes database

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use zettel_common::{NoteId, UserId};

/// A stored note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub user_id: UserId,
    pub title: String,
    pub content: String,
    /// Comma-separated, `None` when the user skipped tags
    pub tags: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Note {
    /// Individual tags with surrounding whitespace removed
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Case-insensitive substring match over title, content and tags
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return false;
        }

        self.title.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
            || self
                .tags
                .as_deref()
                .is_some_and(|tags| tags.to_lowercase().contains(&needle))
    }
}

/// Input of the note-creation wizard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub tags: Option<String>,
}

impl NewNote {
    /// Blank `tags` input is stored as no tags
    pub fn new(title: impl Into<String>, content: impl Into<String>, tags: &str) -> Self {
        let tags = tags.trim();
        Self {
            title: title.into(),
            content: content.into(),
            tags: (!tags.is_empty()).then(|| tags.to_string()),
        }
    }
}

/// What the notes list shows for each note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    pub id: NoteId,
    pub title: String,
    pub created_at: NaiveDateTime,
}

/// A neighbour of a note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedNote {
    pub id: NoteId,
    pub title: String,
}

/// A raw `note_links` row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteLink {
    pub id: i64,
    pub from_note_id: NoteId,
    pub to_note_id: NoteId,
    pub created_at: NaiveDateTime,
}

/// Result of asking for a link between two notes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    /// The pair was already linked in either direction
    AlreadyLinked,
    SelfLink,
    /// One of the notes does not exist or belongs to someone else
    NotFound,
}

/// A user's notes and the links among them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphData {
    pub notes: BTreeMap<NoteId, String>,
    /// As stored; may hold both directions of a pair
    pub links: Vec<(NoteId, NoteId)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn note(title: &str, content: &str, tags: Option<&str>) -> Note {
        Note {
            id: NoteId(1),
            user_id: UserId(10),
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.map(str::to_string),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_new_note_blank_tags() {
        assert_eq!(NewNote::new("t", "c", "   ").tags, None);
        assert_eq!(NewNote::new("t", "c", " rust, sql ").tags.as_deref(), Some("rust, sql"));
    }

    #[test]
    fn test_tag_list() {
        let n = note("t", "c", Some("rust, ,sqlite ,graphs"));
        assert_eq!(n.tag_list(), vec!["rust", "sqlite", "graphs"]);
        assert!(note("t", "c", None).tag_list().is_empty());
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let n = note("Заметка о Rust", "Владение и заимствование", Some("Язык"));
        assert!(n.matches("RUST"));
        assert!(n.matches("заимствование"));
        assert!(n.matches("язык"));
        assert!(!n.matches("python"));
        assert!(!n.matches("   "));
    }
}
