//! Identifier newtypes shared across the workspace.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident($inner:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }
    };
}

id_newtype!(
    /// Primary key of a row in the `notes` table.
    NoteId(i64)
);

id_newtype!(
    /// A Telegram user id; owner of notes.
    UserId(i64)
);

id_newtype!(
    /// A Telegram chat id.
    ChatId(i64)
);

id_newtype!(
    /// A Telegram message id, unique within its chat.
    MessageId(i32)
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let id: NoteId = "17".parse().unwrap();
        assert_eq!(id, NoteId(17));
        assert_eq!(id.to_string(), "17");
        assert!("abc".parse::<NoteId>().is_err());
        assert_eq!(ChatId::from(-100_123).to_string(), "-100123");
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "42");
        let back: MessageId = serde_json::from_str("7").unwrap();
        assert_eq!(back, MessageId(7));
    }
}
