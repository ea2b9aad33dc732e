//! Telegram Bot API wire types
//!
//! Only the fields the bot reads are modelled; serde ignores the rest.

use serde::Deserialize;
use zettel_commands::{IncomingCallback, IncomingMessage, IncomingUpdate};
use zettel_common::{ChatId, MessageId, Result, UserId, ZettelError};

/// Envelope wrapping every Bot API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
    pub error_code: Option<i64>,
    pub parameters: Option<ResponseParameters>,
}

/// Extra details attached to some errors
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseParameters {
    /// Seconds to wait after a flood-control error
    pub retry_after: Option<u64>,
}

impl<T> ApiResponse<T> {
    /// The payload, or the API's error as a `ZettelError::Telegram`
    pub fn into_result(self) -> Result<T> {
        let description = self.description.unwrap_or_else(|| "Unknown error".to_string());
        match (self.ok, self.result) {
            (true, Some(result)) => Ok(result),
            (true, None) => Err(ZettelError::telegram("Response carried no result")),
            (false, _) => Err(match self.error_code {
                Some(code) => ZettelError::telegram_with_code(description, code),
                None => ZettelError::telegram(description),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: ChatId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: MessageId,
    /// Absent for channel posts
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// Absent when the keyboard's message is too old
    pub message: Option<Message>,
    pub data: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

impl Update {
    /// Id of a button press that carries nothing to act on: no keyboard
    /// message or no data. Such queries still need an answer.
    pub fn stale_callback_id(&self) -> Option<&str> {
        if self.message.is_some() {
            return None;
        }
        let query = self.callback_query.as_ref()?;
        (query.message.is_none() || query.data.is_none()).then_some(query.id.as_str())
    }

    /// Convert into a dispatcher event; `None` for updates the bot ignores
    pub fn into_incoming(self) -> Option<IncomingUpdate> {
        if let Some(message) = self.message {
            let user = message.from?;
            if user.is_bot {
                return None;
            }
            return Some(IncomingUpdate::Message(IncomingMessage {
                chat_id: message.chat.id,
                user_id: user.id,
                message_id: message.message_id,
                text: message.text,
            }));
        }

        let query = self.callback_query?;
        let message = query.message?;
        Some(IncomingUpdate::Callback(IncomingCallback {
            id: query.id,
            chat_id: message.chat.id,
            user_id: query.from.id,
            message_id: message.message_id,
            data: query.data?,
        }))
    }
}
