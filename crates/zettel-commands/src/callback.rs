//! Inline button payloads

use std::fmt;
use std::str::FromStr;

use zettel_common::{NoteId, ZettelError};

/// Action encoded in an inline button's `callback_data`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackAction {
    ViewNote(NoteId),
    /// Show the picker of notes to link with
    LinkNote(NoteId),
    CreateLink { from: NoteId, to: NoteId },
    DeleteNote(NoteId),
    BackToNotes,
    TextTree,
    ImageGraph,
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ViewNote(id) => write!(f, "view_note_{id}"),
            Self::LinkNote(id) => write!(f, "link_note_{id}"),
            Self::CreateLink { from, to } => write!(f, "create_link_{from}_{to}"),
            Self::DeleteNote(id) => write!(f, "delete_note_{id}"),
            Self::BackToNotes => f.write_str("back_to_notes"),
            Self::TextTree => f.write_str("text_tree"),
            Self::ImageGraph => f.write_str("image_graph"),
        }
    }
}

impl FromStr for CallbackAction {
    type Err = ZettelError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let invalid = || ZettelError::validation_field(format!("Malformed callback data: {data}"), "callback_data");
        let note_id = |raw: &str| raw.parse::<NoteId>().map_err(|_| invalid());

        match data {
            "back_to_notes" => return Ok(Self::BackToNotes),
            "text_tree" => return Ok(Self::TextTree),
            "image_graph" => return Ok(Self::ImageGraph),
            _ => {}
        }

        if let Some(id) = data.strip_prefix("view_note_") {
            Ok(Self::ViewNote(note_id(id)?))
        } else if let Some(id) = data.strip_prefix("link_note_") {
            Ok(Self::LinkNote(note_id(id)?))
        } else if let Some(id) = data.strip_prefix("delete_note_") {
            Ok(Self::DeleteNote(note_id(id)?))
        } else if let Some(pair) = data.strip_prefix("create_link_") {
            let (from, to) = pair.split_once('_').ok_or_else(invalid)?;
            Ok(Self::CreateLink {
                from: note_id(from)?,
                to: note_id(to)?,
            })
        } else {
            Err(invalid())
        }
    }
}

impl CallbackAction {
    /// Name used in logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ViewNote(_) => "view_note",
            Self::LinkNote(_) => "link_note",
            Self::CreateLink { .. } => "create_link",
            Self::DeleteNote(_) => "delete_note",
            Self::BackToNotes => "back_to_notes",
            Self::TextTree => "text_tree",
            Self::ImageGraph => "image_graph",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let actions = [
            CallbackAction::ViewNote(NoteId(7)),
            CallbackAction::LinkNote(NoteId(7)),
            CallbackAction::CreateLink {
                from: NoteId(3),
                to: NoteId(12),
            },
            CallbackAction::DeleteNote(NoteId(1)),
            CallbackAction::BackToNotes,
            CallbackAction::TextTree,
            CallbackAction::ImageGraph,
        ];
        for action in actions {
            assert_eq!(action.to_string().parse::<CallbackAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(
            CallbackAction::CreateLink {
                from: NoteId(3),
                to: NoteId(12)
            }
            .to_string(),
            "create_link_3_12"
        );
        assert_eq!(CallbackAction::ViewNote(NoteId(5)).to_string(), "view_note_5");
    }

    #[test]
    fn test_malformed_data() {
        for data in ["", "view_note_", "view_note_x", "create_link_1", "create_link_1_x", "launch"] {
            let err = data.parse::<CallbackAction>().unwrap_err();
            assert!(matches!(err, ZettelError::Validation { .. }), "{data}");
        }
    }
}
