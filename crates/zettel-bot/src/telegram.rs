//! Telegram Bot API client over reqwest
//!
//! Every method posts JSON (or a multipart form for photos) to
//! `{api_url}/bot{token}/{method}` and unwraps the `{ok, result}` envelope.
//! A flood-control answer on a JSON call is waited out once before giving up.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use tracing::{debug, instrument, warn};
use zettel_commands::{BotApi, InlineKeyboardMarkup, MessageEdit, OutgoingMessage, ParseMode, ReplyMarkup};
use zettel_common::{ChatId, MessageId, Result, ZettelError};
use zettel_config::TelegramConfig;

use crate::types::{ApiResponse, Message, Update, User};

/// Updates the bot subscribes to
const ALLOWED_UPDATES: [&str; 2] = ["message", "callback_query"];

/// Longest flood-control pause honoured before failing the call
const MAX_FLOOD_WAIT: Duration = Duration::from_secs(30);

const PHOTO_FILE_NAME: &str = "notes_graph.png";

#[derive(Serialize)]
struct GetUpdates<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: ChatId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a ReplyMarkup>,
}

#[derive(Serialize)]
struct EditMessageText<'a> {
    chat_id: ChatId,
    message_id: MessageId,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

#[derive(Serialize)]
struct DeleteMessage {
    chat_id: ChatId,
    message_id: MessageId,
}

/// HTTP client bound to one bot token
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
    poll_timeout: Duration,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("base_url", &"<redacted>")
            .field("poll_timeout", &self.poll_timeout)
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// Build a client from the `telegram` settings
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ZettelError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", config.api_url.trim_end_matches('/'), config.token),
            poll_timeout: config.poll_timeout(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.base_url)
    }

    #[instrument(skip(self, params), fields(method = %method))]
    async fn call<P, T>(&self, method: &str, params: &P) -> Result<T>
    where
        P: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.post_json::<P, T>(method, params).await?;

        let flood_wait = match (&response.error_code, &response.parameters) {
            (Some(429), Some(parameters)) => parameters.retry_after.map(Duration::from_secs),
            _ => None,
        };
        match flood_wait {
            Some(wait) if wait <= MAX_FLOOD_WAIT => {
                warn!(wait_seconds = wait.as_secs(), "Flood control hit, waiting before retry");
                tokio::time::sleep(wait).await;
                self.post_json::<P, T>(method, params).await?.into_result()
            }
            _ => response.into_result(),
        }
    }

    async fn post_json<P, T>(&self, method: &str, params: &P) -> Result<ApiResponse<T>>
    where
        P: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!(method, "Calling Bot API");
        // Error answers come with 4xx statuses but still carry the envelope
        let response = self.client.post(self.method_url(method)).json(params).send().await?;
        Ok(response.json().await?)
    }

    /// Identity of the bot; fails on a bad token
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &serde_json::json!({})).await
    }

    /// Long-poll for updates starting at `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let request = GetUpdates {
            offset,
            timeout: self.poll_timeout.as_secs(),
            allowed_updates: &ALLOWED_UPDATES,
        };
        self.call("getUpdates", &request).await
    }
}

/// Unchanged edits are answered with this error, which is harmless
fn is_not_modified(error: &ZettelError) -> bool {
    matches!(error, ZettelError::Telegram { message, .. } if message.contains("message is not modified"))
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn send_message(&self, chat_id: ChatId, message: OutgoingMessage) -> Result<MessageId> {
        let request = SendMessage {
            chat_id,
            text: &message.text,
            parse_mode: message.parse_mode,
            reply_markup: message.reply_markup.as_ref(),
        };
        let sent: Message = self.call("sendMessage", &request).await?;
        Ok(sent.message_id)
    }

    async fn edit_message(&self, chat_id: ChatId, message_id: MessageId, edit: MessageEdit) -> Result<()> {
        let request = EditMessageText {
            chat_id,
            message_id,
            text: &edit.text,
            parse_mode: edit.parse_mode,
            reply_markup: edit.reply_markup.as_ref(),
        };
        match self.call::<_, IgnoredAny>("editMessageText", &request).await {
            Ok(_) => Ok(()),
            Err(e) if is_not_modified(&e) => {
                debug!(%chat_id, %message_id, "Edit left the message unchanged");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn answer_callback(&self, callback_id: &str, text: Option<String>) -> Result<()> {
        let request = AnswerCallbackQuery {
            callback_query_id: callback_id,
            text: text.as_deref(),
        };
        self.call::<_, bool>("answerCallbackQuery", &request).await.map(drop)
    }

    async fn send_photo(&self, chat_id: ChatId, png: Vec<u8>, caption: OutgoingMessage) -> Result<MessageId> {
        let photo = Part::bytes(png).file_name(PHOTO_FILE_NAME).mime_str("image/png")?;
        let mut form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.text)
            .part("photo", photo);
        if let Some(ParseMode::Html) = caption.parse_mode {
            form = form.text("parse_mode", "HTML");
        }
        if let Some(markup) = &caption.reply_markup {
            form = form.text("reply_markup", serde_json::to_string(markup)?);
        }

        debug!(%chat_id, "Uploading photo");
        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;
        let sent: ApiResponse<Message> = response.json().await?;
        Ok(sent.into_result()?.message_id)
    }

    async fn delete_message(&self, chat_id: ChatId, message_id: MessageId) -> Result<()> {
        let request = DeleteMessage { chat_id, message_id };
        self.call::<_, bool>("deleteMessage", &request).await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_url: &str) -> TelegramConfig {
        TelegramConfig {
            token: "123456:ABC".to_string(),
            api_url: api_url.to_string(),
            ..TelegramConfig::default()
        }
    }

    #[test]
    fn test_method_url() {
        let client = TelegramClient::new(&config("https://api.telegram.org/")).unwrap();
        assert_eq!(
            client.method_url("getMe"),
            "https://api.telegram.org/bot123456:ABC/getMe"
        );
    }

    #[test]
    fn test_debug_hides_token() {
        let client = TelegramClient::new(&config("https://api.telegram.org")).unwrap();
        assert!(!format!("{client:?}").contains("ABC"));
    }

    #[test]
    fn test_get_updates_payload() {
        let request = GetUpdates {
            offset: 10,
            timeout: 30,
            allowed_updates: &ALLOWED_UPDATES,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"offset": 10, "timeout": 30, "allowed_updates": ["message", "callback_query"]})
        );
    }

    #[test]
    fn test_send_message_payload_skips_empty_fields() {
        let request = SendMessage {
            chat_id: ChatId(5),
            text: "hi",
            parse_mode: None,
            reply_markup: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({"chat_id": 5, "text": "hi"})
        );
    }

    #[test]
    fn test_not_modified_detection() {
        let error = ZettelError::telegram_with_code(
            "Bad Request: message is not modified: specified new message content and reply markup are exactly the same",
            400,
        );
        assert!(is_not_modified(&error));
        assert!(!is_not_modified(&ZettelError::telegram_with_code("Bad Request: chat not found", 400)));
    }
}
