//! Slash command parsing

use zettel_common::NoteId;

/// A recognized `/command`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    New,
    Notes,
    /// `/search` with an optional query
    Search(Option<String>),
    Tree,
    Graph,
    /// `/view_<id>`, printed in search results
    View(NoteId),
    Unknown(String),
}

impl Command {
    /// Parse a message text. Returns `None` when it is not a command.
    ///
    /// A `@BotName` suffix on the command word is ignored, as sent by
    /// Telegram clients in group chats.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let rest = text.strip_prefix('/')?;

        let (word, argument) = match rest.split_once(char::is_whitespace) {
            Some((word, argument)) => (word, argument.trim()),
            None => (rest, ""),
        };
        let name = word.split('@').next().unwrap_or_default();

        let command = match name {
            "start" => Self::Start,
            "help" => Self::Help,
            "new" => Self::New,
            "notes" => Self::Notes,
            "search" => Self::Search((!argument.is_empty()).then(|| argument.to_string())),
            "tree" => Self::Tree,
            "graph" => Self::Graph,
            other => other
                .strip_prefix("view_")
                .and_then(|id| id.parse::<NoteId>().ok())
                .map_or_else(|| Self::Unknown(other.to_string()), Self::View),
        };
        Some(command)
    }

    /// Name used in logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::New => "new",
            Self::Notes => "notes",
            Self::Search(_) => "search",
            Self::Tree => "tree",
            Self::Graph => "graph",
            Self::View(_) => "view",
            Self::Unknown(_) => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_commands() {
        assert_eq!(Command::parse("/start"), Some(Command::Start));
        assert_eq!(Command::parse("/help"), Some(Command::Help));
        assert_eq!(Command::parse("/new"), Some(Command::New));
        assert_eq!(Command::parse("/notes"), Some(Command::Notes));
        assert_eq!(Command::parse("/tree"), Some(Command::Tree));
        assert_eq!(Command::parse(" /graph "), Some(Command::Graph));
    }

    #[test]
    fn test_bot_name_suffix() {
        assert_eq!(Command::parse("/notes@ZettelBot"), Some(Command::Notes));
        assert_eq!(
            Command::parse("/search@ZettelBot rust"),
            Some(Command::Search(Some("rust".into())))
        );
    }

    #[test]
    fn test_search_query() {
        assert_eq!(Command::parse("/search"), Some(Command::Search(None)));
        assert_eq!(Command::parse("/search   "), Some(Command::Search(None)));
        assert_eq!(
            Command::parse("/search  atomic notes "),
            Some(Command::Search(Some("atomic notes".into())))
        );
    }

    #[test]
    fn test_view_shortcut() {
        assert_eq!(Command::parse("/view_42"), Some(Command::View(NoteId(42))));
        assert_eq!(
            Command::parse("/view_x"),
            Some(Command::Unknown("view_x".into()))
        );
    }

    #[test]
    fn test_not_a_command() {
        assert_eq!(Command::parse("hello"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("/frobnicate"), Some(Command::Unknown("frobnicate".into())));
        assert_eq!(Command::Unknown("x".into()).name(), "unknown");
    }
}
