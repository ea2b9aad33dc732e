//! Incoming events, already stripped of transport details

use zettel_common::{ChatId, MessageId, UserId};

/// A text message from a user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub user_id: UserId,
    pub message_id: MessageId,
    /// `None` for stickers, photos and other non-text messages
    pub text: Option<String>,
}

/// A press on an inline keyboard button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingCallback {
    /// Id to pass back when answering the query
    pub id: String,
    pub chat_id: ChatId,
    /// The user who pressed the button
    pub user_id: UserId,
    /// The message carrying the keyboard
    pub message_id: MessageId,
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingUpdate {
    Message(IncomingMessage),
    Callback(IncomingCallback),
}

impl IncomingUpdate {
    pub const fn chat_id(&self) -> ChatId {
        match self {
            Self::Message(message) => message.chat_id,
            Self::Callback(callback) => callback.chat_id,
        }
    }
}
