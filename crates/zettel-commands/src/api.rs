//! Outgoing side of the bot: what handlers can ask the transport to do.
//!
//! Markup types serialize to the JSON shapes the Telegram Bot API expects,
//! so a transport can embed them in requests unchanged.

use async_trait::async_trait;
use serde::Serialize;
use zettel_common::{ChatId, MessageId, Result};

/// Text formatting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    #[serde(rename = "HTML")]
    Html,
}

/// Button of a reply keyboard; pressing it sends its text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

/// Keyboard shown in place of the phone keyboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

impl ReplyKeyboardMarkup {
    /// Lay the labels out `per_row` buttons at a time
    pub fn from_labels(labels: Vec<String>, per_row: usize) -> Self {
        let keyboard = labels
            .chunks(per_row.max(1))
            .map(|row| {
                row.iter()
                    .map(|text| KeyboardButton { text: text.clone() })
                    .collect()
            })
            .collect();
        Self {
            keyboard,
            resize_keyboard: true,
        }
    }
}

/// Button attached to a message that reports `callback_data` when pressed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineKeyboardButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

impl InlineKeyboardMarkup {
    #[must_use]
    pub fn row(mut self, buttons: Vec<InlineKeyboardButton>) -> Self {
        self.inline_keyboard.push(buttons);
        self
    }

    /// Adds a row holding a single button
    #[must_use]
    pub fn button(self, button: InlineKeyboardButton) -> Self {
        self.row(vec![button])
    }

    /// All buttons in row order
    pub fn buttons(&self) -> impl Iterator<Item = &InlineKeyboardButton> {
        self.inline_keyboard.iter().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Keyboard(ReplyKeyboardMarkup),
    Inline(InlineKeyboardMarkup),
}

impl From<ReplyKeyboardMarkup> for ReplyMarkup {
    fn from(markup: ReplyKeyboardMarkup) -> Self {
        Self::Keyboard(markup)
    }
}

impl From<InlineKeyboardMarkup> for ReplyMarkup {
    fn from(markup: InlineKeyboardMarkup) -> Self {
        Self::Inline(markup)
    }
}

/// A new message (or photo caption)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub reply_markup: Option<ReplyMarkup>,
}

impl OutgoingMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            reply_markup: None,
        }
    }

    #[must_use]
    pub const fn html(mut self) -> Self {
        self.parse_mode = Some(ParseMode::Html);
        self
    }

    #[must_use]
    pub fn markup(mut self, markup: impl Into<ReplyMarkup>) -> Self {
        self.reply_markup = Some(markup.into());
        self
    }
}

/// Replacement text for an existing message. Telegram only accepts inline
/// keyboards on edited messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEdit {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl MessageEdit {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: None,
            reply_markup: None,
        }
    }

    #[must_use]
    pub const fn html(mut self) -> Self {
        self.parse_mode = Some(ParseMode::Html);
        self
    }

    #[must_use]
    pub fn markup(mut self, markup: InlineKeyboardMarkup) -> Self {
        self.reply_markup = Some(markup);
        self
    }
}

/// Operations the dispatcher needs from a chat transport
#[async_trait]
pub trait BotApi: Send + Sync {
    async fn send_message(&self, chat_id: ChatId, message: OutgoingMessage) -> Result<MessageId>;

    async fn edit_message(&self, chat_id: ChatId, message_id: MessageId, edit: MessageEdit) -> Result<()>;

    /// Stop the button's loading indicator, optionally showing a toast
    async fn answer_callback(&self, callback_id: &str, text: Option<String>) -> Result<()>;

    async fn send_photo(&self, chat_id: ChatId, png: Vec<u8>, caption: OutgoingMessage) -> Result<MessageId>;

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_keyboard_json() {
        let markup = ReplyMarkup::from(ReplyKeyboardMarkup::from_labels(
            vec!["a".into(), "b".into(), "c".into()],
            2,
        ));
        assert_eq!(
            serde_json::to_value(markup).unwrap(),
            json!({
                "keyboard": [[{"text": "a"}, {"text": "b"}], [{"text": "c"}]],
                "resize_keyboard": true
            })
        );
    }

    #[test]
    fn test_inline_keyboard_json() {
        let markup = InlineKeyboardMarkup::default()
            .row(vec![
                InlineKeyboardButton::new("Link", "link_note_1"),
                InlineKeyboardButton::new("Delete", "delete_note_1"),
            ])
            .button(InlineKeyboardButton::new("Back", "back_to_notes"));

        assert_eq!(markup.buttons().count(), 3);
        assert_eq!(
            serde_json::to_value(ReplyMarkup::from(markup)).unwrap(),
            json!({
                "inline_keyboard": [
                    [
                        {"text": "Link", "callback_data": "link_note_1"},
                        {"text": "Delete", "callback_data": "delete_note_1"}
                    ],
                    [{"text": "Back", "callback_data": "back_to_notes"}]
                ]
            })
        );
        assert_eq!(serde_json::to_value(ParseMode::Html).unwrap(), json!("HTML"));
    }
}
