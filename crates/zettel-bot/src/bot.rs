//! Long-polling loop feeding the dispatcher.

use std::sync::Arc;
use std::time::Duration;

use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, error, info, warn};
use zettel_commands::{BotApi, Dispatcher};
use zettel_common::ZettelError;
use zettel_config::Config;
use zettel_graphs::PngGraphRenderer;
use zettel_i18n::{I18nManager, Locale};
use zettel_store::NoteStore;

use crate::error::{BotError, BotResult};
use crate::telegram::TelegramClient;
use crate::types::Update;

/// Attempts per `getUpdates` call before the loop pauses
const FETCH_ATTEMPTS: usize = 5;

/// Pause after a fetch failed every attempt
const FETCH_FAILURE_PAUSE: Duration = Duration::from_secs(5);

/// Whether a failed Bot API call is worth repeating
pub fn is_transient(error: &ZettelError) -> bool {
    match error {
        ZettelError::Network { .. } => true,
        ZettelError::Telegram { error_code, .. } => matches!(error_code, Some(429) | Some(500..=599)),
        _ => false,
    }
}

/// Whether a failed Bot API call means the bot cannot run at all
fn is_fatal(error: &ZettelError) -> bool {
    // 401: bad token, 409: webhook set or another instance polling
    matches!(error.telegram_code(), Some(401 | 404 | 409))
}

/// Stop the spinner on a button press the dispatcher cannot route
async fn answer_stale_callback(api: &dyn BotApi, callback_id: &str) {
    if let Err(e) = api.answer_callback(callback_id, None).await {
        warn!(error = %e, callback_id, "Failed to answer callback query");
    }
}

/// The running bot: Telegram transport plus command dispatcher
pub struct ZettelBot {
    client: TelegramClient,
    dispatcher: Dispatcher,
}

impl ZettelBot {
    pub const fn new(client: TelegramClient, dispatcher: Dispatcher) -> Self {
        Self { client, dispatcher }
    }

    /// Validate the settings, then wire up storage, localization and rendering
    pub async fn from_config(config: &Config) -> BotResult<Self> {
        config.validate_for_bot()?;
        let locale = Locale::from_code(&config.telegram.language)
            .ok_or_else(|| BotError::Language(config.telegram.language.clone()))?;

        let store = NoteStore::connect(&config.database.path, config.database.max_connections).await?;
        let i18n = Arc::new(I18nManager::new(locale)?);
        let renderer = Arc::new(PngGraphRenderer::from_config(&config.graph)?);
        let client = TelegramClient::new(&config.telegram)?;

        info!(database = %config.database.path, %locale, "Bot components initialized");
        Ok(Self::new(client, Dispatcher::new(store, i18n, locale, renderer)))
    }

    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Poll and handle updates until Ctrl-C
    pub async fn run(&self) -> BotResult<()> {
        let me = self.client.get_me().await.map_err(|e| {
            if is_fatal(&e) {
                BotError::Rejected(e.to_string())
            } else {
                BotError::Zettel(e)
            }
        })?;
        info!(
            bot_id = %me.id,
            username = me.username.as_deref().unwrap_or_default(),
            "Connected to Telegram"
        );

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        let mut offset = 0;
        loop {
            let fetched = tokio::select! {
                result = &mut shutdown => {
                    if let Err(e) = result {
                        warn!(error = %e, "Failed to listen for Ctrl-C");
                    }
                    info!("Shutdown requested");
                    break;
                }
                fetched = self.fetch_updates(offset) => fetched,
            };

            match fetched {
                Ok(updates) => offset = self.process(updates, offset).await,
                Err(e) if is_fatal(&e) => {
                    error!(error = %e, "Telegram refused to deliver updates");
                    return Err(BotError::Rejected(e.to_string()));
                }
                Err(e) => {
                    error!(error = %e, "Fetching updates failed, pausing");
                    tokio::time::sleep(FETCH_FAILURE_PAUSE).await;
                }
            }
        }

        self.dispatcher.store().close().await;
        info!("Bot stopped");
        Ok(())
    }

    async fn fetch_updates(&self, offset: i64) -> Result<Vec<Update>, ZettelError> {
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(250)
            .max_delay(Duration::from_secs(30))
            .map(jitter)
            .take(FETCH_ATTEMPTS);

        RetryIf::spawn(
            strategy,
            || async {
                self.client.get_updates(offset).await.map_err(|e| {
                    if is_transient(&e) {
                        warn!(error = %e, "getUpdates failed, will retry");
                    }
                    e
                })
            },
            is_transient,
        )
        .await
    }

    /// Handle updates in order; returns the next offset
    async fn process(&self, updates: Vec<Update>, mut offset: i64) -> i64 {
        if !updates.is_empty() {
            debug!(count = updates.len(), "Received updates");
        }
        for update in updates {
            offset = offset.max(update.update_id + 1);
            let update_id = update.update_id;
            let stale_callback = update.stale_callback_id().map(str::to_owned);
            match update.into_incoming() {
                Some(incoming) => self.dispatcher.handle(&self.client, incoming).await,
                None => {
                    if let Some(callback_id) = stale_callback {
                        answer_stale_callback(&self.client, &callback_id).await;
                    }
                    debug!(update_id, "Skipping unsupported update");
                }
            }
        }
        offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use zettel_commands::{MessageEdit, OutgoingMessage};
    use zettel_common::{ChatId, MessageId};

    #[derive(Default)]
    struct AnswerLog {
        answered: Mutex<Vec<(String, Option<String>)>>,
    }

    #[async_trait::async_trait]
    impl BotApi for AnswerLog {
        async fn send_message(&self, _: ChatId, _: OutgoingMessage) -> zettel_common::Result<MessageId> {
            unreachable!("only callback answers are expected")
        }

        async fn edit_message(&self, _: ChatId, _: MessageId, _: MessageEdit) -> zettel_common::Result<()> {
            unreachable!("only callback answers are expected")
        }

        async fn answer_callback(&self, callback_id: &str, text: Option<String>) -> zettel_common::Result<()> {
            self.answered.lock().unwrap().push((callback_id.to_string(), text));
            Ok(())
        }

        async fn send_photo(&self, _: ChatId, _: Vec<u8>, _: OutgoingMessage) -> zettel_common::Result<MessageId> {
            unreachable!("only callback answers are expected")
        }

        async fn delete_message(&self, _: ChatId, _: MessageId) -> zettel_common::Result<()> {
            unreachable!("only callback answers are expected")
        }
    }

    #[tokio::test]
    async fn test_stale_callback_is_answered_without_text() {
        let api = AnswerLog::default();
        answer_stale_callback(&api, "q7").await;
        assert_eq!(*api.answered.lock().unwrap(), vec![("q7".to_string(), None)]);
    }

    #[test]
    fn test_transient_errors() {
        assert!(is_transient(&ZettelError::network("Connection failed")));
        assert!(is_transient(&ZettelError::telegram_with_code("Too Many Requests", 429)));
        assert!(is_transient(&ZettelError::telegram_with_code("Bad Gateway", 502)));
        assert!(!is_transient(&ZettelError::telegram_with_code("Unauthorized", 401)));
        assert!(!is_transient(&ZettelError::validation("bad input")));
    }

    #[test]
    fn test_fatal_errors() {
        assert!(is_fatal(&ZettelError::telegram_with_code("Unauthorized", 401)));
        assert!(is_fatal(&ZettelError::telegram_with_code("Conflict: terminated by other getUpdates request", 409)));
        assert!(!is_fatal(&ZettelError::telegram_with_code("Too Many Requests", 429)));
        assert!(!is_fatal(&ZettelError::network("timeout")));
    }

    #[tokio::test]
    async fn test_from_config_requires_token() {
        let config = Config::default();
        let result = ZettelBot::from_config(&config).await;
        assert!(matches!(result, Err(BotError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_from_config_rejects_malformed_token() {
        let mut config = Config::default();
        config.telegram.token = "not-a-token".into();
        let result = ZettelBot::from_config(&config).await;
        assert!(matches!(result, Err(BotError::InvalidConfig(_))));
    }
}
