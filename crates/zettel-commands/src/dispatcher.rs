//! Routing of incoming updates to note operations.
//!
//! Text messages are tried as a slash command first, then as a reply
//! keyboard button, then as input for the note creation wizard, and
//! finally as a search query. Inline button presses are decoded into a
//! [`CallbackAction`] and always answered.
//!
//! Handlers never propagate errors to the transport: a failure is logged
//! with its context and the user gets the operation's generic error text.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};
use zettel_common::{ChatId, MessageId, NoteId, Result, UserId, ZettelError};
use zettel_graphs::{GraphRenderer, NoteForest, NoteGraph};
use zettel_i18n::{fluent_args, FluentArgs, I18nManager, Locale};
use zettel_store::{GraphData, LinkOutcome, NewNote, NoteStore};

use crate::api::{BotApi, InlineKeyboardButton, InlineKeyboardMarkup, MessageEdit, OutgoingMessage};
use crate::callback::CallbackAction;
use crate::command::Command;
use crate::keyboard::{
    back_to_menu_keyboard, cancel_keyboard, commands_keyboard, main_keyboard, visualization_keyboard,
    MenuButton,
};
use crate::state::{DialogueState, DialogueStore};
use crate::update::{IncomingCallback, IncomingMessage, IncomingUpdate};
use crate::views;

/// Shared state of the bot's handlers
pub struct Dispatcher {
    store: NoteStore,
    i18n: Arc<I18nManager>,
    locale: Locale,
    dialogues: DialogueStore,
    renderer: Arc<dyn GraphRenderer>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("locale", &self.locale)
            .field("renderer", &self.renderer.name())
            .field("active_dialogues", &self.dialogues.active())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(
        store: NoteStore,
        i18n: Arc<I18nManager>,
        locale: Locale,
        renderer: Arc<dyn GraphRenderer>,
    ) -> Self {
        Self {
            store,
            i18n,
            locale,
            dialogues: DialogueStore::new(),
            renderer,
        }
    }

    pub const fn dialogues(&self) -> &DialogueStore {
        &self.dialogues
    }

    pub const fn store(&self) -> &NoteStore {
        &self.store
    }

    fn t(&self, key: &str) -> String {
        self.i18n.text(key, self.locale)
    }

    fn t_with(&self, key: &str, args: &FluentArgs<'_>) -> String {
        self.i18n.text_with(key, self.locale, args)
    }

    fn with_main_keyboard(&self, text: String) -> OutgoingMessage {
        OutgoingMessage::new(text).markup(main_keyboard(&self.i18n, self.locale))
    }

    /// Handle one update to completion
    pub async fn handle(&self, api: &dyn BotApi, update: IncomingUpdate) {
        match update {
            IncomingUpdate::Message(message) => self.handle_message(api, message).await,
            IncomingUpdate::Callback(callback) => self.handle_callback(api, callback).await,
        }
    }

    // Text messages

    #[instrument(skip_all, fields(chat_id = %message.chat_id, user_id = %message.user_id))]
    async fn handle_message(&self, api: &dyn BotApi, message: IncomingMessage) {
        let Some(text) = message.text.as_deref() else {
            debug!("Ignoring non-text message");
            return;
        };

        if let Some(command) = Command::parse(text) {
            info!(command = command.name(), "Handling command");
            self.leave_wizard(message.chat_id);
            self.run_command(api, &message, command).await;
        } else if let Some(button) = MenuButton::from_text(&self.i18n, self.locale, text) {
            info!(button = ?button, "Handling menu button");
            if button != MenuButton::Cancel {
                self.leave_wizard(message.chat_id);
            }
            self.run_menu_button(api, &message, button).await;
        } else {
            match self.dialogues.get(message.chat_id) {
                DialogueState::Idle => self.free_text_search(api, &message, text).await,
                state => self.advance_wizard(api, &message, state, text).await,
            }
        }
    }

    /// Any command or menu action other than cancel abandons a half-filled note
    fn leave_wizard(&self, chat_id: ChatId) {
        if self.dialogues.clear(chat_id) {
            debug!(%chat_id, "Note wizard abandoned");
        }
    }

    async fn run_command(&self, api: &dyn BotApi, message: &IncomingMessage, command: Command) {
        let chat_id = message.chat_id;
        let user_id = message.user_id;

        let (result, error_key) = match command {
            Command::Start => (self.reply(api, chat_id, "welcome").await, "callback-error"),
            Command::Help => (self.reply(api, chat_id, "help").await, "callback-error"),
            Command::New => (self.start_wizard(api, chat_id).await, "error-note-create"),
            Command::Notes => (self.send_notes_list(api, chat_id, user_id).await, "error-notes-list"),
            Command::Search(Some(query)) => (self.search(api, chat_id, user_id, &query).await, "error-search"),
            Command::Search(None) => (self.prompt_search(api, chat_id).await, "error-search"),
            Command::Tree => (self.send_tree(api, chat_id, user_id).await, "error-tree"),
            Command::Graph => (self.graph_menu(api, chat_id, user_id).await, "error-graph"),
            Command::View(note_id) => (
                self.send_note_detail(api, chat_id, user_id, note_id).await,
                "error-note-detail",
            ),
            Command::Unknown(name) => {
                debug!(name = %name, "Unknown command");
                (self.reply(api, chat_id, "use-buttons").await, "callback-error")
            }
        };

        if let Err(e) = result {
            self.report_failure(api, chat_id, error_key, &e).await;
        }
    }

    async fn run_menu_button(&self, api: &dyn BotApi, message: &IncomingMessage, button: MenuButton) {
        let chat_id = message.chat_id;
        let user_id = message.user_id;

        let (result, error_key) = match button {
            MenuButton::NewNote => (self.start_wizard(api, chat_id).await, "error-note-create"),
            MenuButton::MyNotes => (self.send_notes_list(api, chat_id, user_id).await, "error-notes-list"),
            MenuButton::Search => (self.prompt_search(api, chat_id).await, "error-search"),
            MenuButton::Tree => (self.send_tree(api, chat_id, user_id).await, "error-tree"),
            MenuButton::Graph => (self.graph_menu(api, chat_id, user_id).await, "error-graph"),
            MenuButton::Help => (self.reply(api, chat_id, "help").await, "callback-error"),
            MenuButton::AllCommands => {
                let reply =
                    OutgoingMessage::new(self.t("all-commands")).markup(commands_keyboard(&self.i18n, self.locale));
                (api.send_message(chat_id, reply).await.map(drop), "callback-error")
            }
            MenuButton::MainMenu => (self.reply(api, chat_id, "main-menu").await, "callback-error"),
            MenuButton::Cancel => {
                if self.dialogues.clear(chat_id) {
                    info!(%chat_id, "Note wizard cancelled");
                }
                (self.reply(api, chat_id, "action-cancelled").await, "callback-error")
            }
        };

        if let Err(e) = result {
            self.report_failure(api, chat_id, error_key, &e).await;
        }
    }

    /// Log `error` and tell the user the operation failed
    async fn report_failure(&self, api: &dyn BotApi, chat_id: ChatId, error_key: &str, error: &ZettelError) {
        error!(%chat_id, error = %error, error_key, "Operation failed");
        let reply = self.with_main_keyboard(self.t(error_key));
        if let Err(e) = api.send_message(chat_id, reply).await {
            error!(%chat_id, error = %e, "Failed to send error reply");
        }
    }

    async fn reply(&self, api: &dyn BotApi, chat_id: ChatId, key: &str) -> Result<()> {
        api.send_message(chat_id, self.with_main_keyboard(self.t(key)))
            .await
            .map(drop)
    }

    async fn prompt_search(&self, api: &dyn BotApi, chat_id: ChatId) -> Result<()> {
        let prompt = OutgoingMessage::new(self.t("search-prompt")).markup(back_to_menu_keyboard(&self.i18n, self.locale));
        api.send_message(chat_id, prompt).await.map(drop)
    }

    // Note creation wizard

    async fn start_wizard(&self, api: &dyn BotApi, chat_id: ChatId) -> Result<()> {
        self.dialogues.set(chat_id, DialogueState::WaitingTitle);
        self.prompt(api, chat_id, "new-note-title-prompt").await
    }

    async fn prompt(&self, api: &dyn BotApi, chat_id: ChatId, key: &str) -> Result<()> {
        let prompt = OutgoingMessage::new(self.t(key)).markup(cancel_keyboard(&self.i18n, self.locale));
        api.send_message(chat_id, prompt).await.map(drop)
    }

    async fn advance_wizard(&self, api: &dyn BotApi, message: &IncomingMessage, state: DialogueState, text: &str) {
        let chat_id = message.chat_id;
        let input = text.trim();

        let result = match state {
            DialogueState::Idle => return,
            DialogueState::WaitingTitle | DialogueState::WaitingContent { .. } if input.is_empty() => {
                self.prompt(api, chat_id, "new-note-empty-input").await
            }
            DialogueState::WaitingTitle => {
                self.dialogues.set(
                    chat_id,
                    DialogueState::WaitingContent {
                        title: input.to_string(),
                    },
                );
                self.prompt(api, chat_id, "new-note-content-prompt").await
            }
            DialogueState::WaitingContent { title } => {
                self.dialogues.set(
                    chat_id,
                    DialogueState::WaitingTags {
                        title,
                        content: input.to_string(),
                    },
                );
                self.prompt(api, chat_id, "new-note-tags-prompt").await
            }
            DialogueState::WaitingTags { title, content } => {
                self.dialogues.clear(chat_id);
                self.save_note(api, chat_id, message.user_id, NewNote::new(title, content, input))
                    .await
            }
        };

        if let Err(e) = result {
            self.dialogues.clear(chat_id);
            self.report_failure(api, chat_id, "error-note-create", &e).await;
        }
    }

    async fn save_note(&self, api: &dyn BotApi, chat_id: ChatId, user_id: UserId, note: NewNote) -> Result<()> {
        let note_id = self.store.add_note(user_id, &note).await?;
        info!(%chat_id, %user_id, %note_id, "Note created");

        let text = self.t_with("note-created", &fluent_args!["id" => note_id.0]);
        api.send_message(chat_id, self.with_main_keyboard(text)).await.map(drop)
    }

    // Notes list, detail and search

    async fn send_notes_list(&self, api: &dyn BotApi, chat_id: ChatId, user_id: UserId) -> Result<()> {
        let notes = self.store.list_notes(user_id).await?;
        let message = if notes.is_empty() {
            self.with_main_keyboard(self.t("notes-empty"))
        } else {
            let (text, keyboard) = views::notes_list(&self.i18n, self.locale, &notes);
            OutgoingMessage::new(text).markup(keyboard)
        };
        api.send_message(chat_id, message).await.map(drop)
    }

    async fn send_note_detail(&self, api: &dyn BotApi, chat_id: ChatId, user_id: UserId, note_id: NoteId) -> Result<()> {
        let Some(note) = self.store.get_note(note_id, user_id).await? else {
            return self.reply(api, chat_id, "note-not-found").await;
        };
        let linked = self.store.linked_notes(note.id).await?;
        let (text, keyboard) = views::note_detail(&self.i18n, self.locale, &note, &linked);
        api.send_message(chat_id, OutgoingMessage::new(text).html().markup(keyboard))
            .await
            .map(drop)
    }

    async fn free_text_search(&self, api: &dyn BotApi, message: &IncomingMessage, text: &str) {
        if text.trim().is_empty() || text.starts_with('/') {
            return;
        }
        if let Err(e) = self.search(api, message.chat_id, message.user_id, text).await {
            self.report_failure(api, message.chat_id, "error-search", &e).await;
        }
    }

    async fn search(&self, api: &dyn BotApi, chat_id: ChatId, user_id: UserId, query: &str) -> Result<()> {
        let query = query.trim();
        let notes = self.store.search_notes(user_id, query).await?;
        debug!(%user_id, query, found = notes.len(), "Search finished");

        if notes.is_empty() {
            let text = self.t_with("search-nothing-found", &fluent_args!["query" => query]);
            return api.send_message(chat_id, self.with_main_keyboard(text)).await.map(drop);
        }

        self.send_parts(api, chat_id, views::search_results(&self.i18n, self.locale, query, &notes))
            .await
    }

    /// Send texts in order; the last one carries the main keyboard
    async fn send_parts(&self, api: &dyn BotApi, chat_id: ChatId, parts: Vec<String>) -> Result<()> {
        let last = parts.len().saturating_sub(1);
        for (i, part) in parts.into_iter().enumerate() {
            let message = if i == last {
                self.with_main_keyboard(part)
            } else {
                OutgoingMessage::new(part)
            };
            api.send_message(chat_id, message).await?;
        }
        Ok(())
    }

    // Tree and graph

    async fn send_tree(&self, api: &dyn BotApi, chat_id: ChatId, user_id: UserId) -> Result<()> {
        let data = self.store.graph_data(user_id).await?;
        if data.notes.is_empty() {
            return self.reply(api, chat_id, "tree-no-notes").await;
        }

        let forest = NoteForest::build(&note_graph(data));
        debug!(%user_id, trees = forest.tree_count(), notes = forest.note_count(), "Tree built");

        let parts = views::tree_messages(&self.i18n, self.locale, &forest.render());
        self.send_parts(api, chat_id, parts).await
    }

    async fn graph_menu(&self, api: &dyn BotApi, chat_id: ChatId, user_id: UserId) -> Result<()> {
        let notes = self.store.list_notes(user_id).await?;
        match notes.len() {
            0 => self.reply(api, chat_id, "graph-no-notes").await,
            1 => self.reply(api, chat_id, "graph-single-note").await,
            _ => {
                let message = OutgoingMessage::new(self.t("graph-choose"))
                    .markup(visualization_keyboard(&self.i18n, self.locale));
                api.send_message(chat_id, message).await.map(drop)
            }
        }
    }

    // Inline buttons

    #[instrument(skip_all, fields(chat_id = %callback.chat_id, user_id = %callback.user_id, data = %callback.data))]
    async fn handle_callback(&self, api: &dyn BotApi, callback: IncomingCallback) {
        let action = match callback.data.parse::<CallbackAction>() {
            Ok(action) => action,
            Err(e) => {
                warn!(error = %e, "Unrecognized callback data");
                self.answer(api, &callback, Some(self.t("callback-unknown"))).await;
                return;
            }
        };
        info!(action = action.name(), "Handling callback");

        // Slow actions stop the button spinner before the work starts
        let early_toast = match action {
            CallbackAction::TextTree => Some("tree-building"),
            CallbackAction::ImageGraph => Some("graph-building"),
            _ => None,
        };
        if let Some(key) = early_toast {
            self.answer(api, &callback, Some(self.t(key))).await;
        }

        let result = match action {
            CallbackAction::ViewNote(note_id) => self.edit_note_detail(api, &callback, note_id).await,
            CallbackAction::LinkNote(note_id) => self.start_linking(api, &callback, note_id).await,
            CallbackAction::CreateLink { from, to } => self.create_link(api, &callback, from, to).await,
            CallbackAction::DeleteNote(note_id) => self.delete_note(api, &callback, note_id).await,
            CallbackAction::BackToNotes => self.edit_notes_list(api, &callback).await,
            CallbackAction::TextTree => self.send_tree(api, callback.chat_id, callback.user_id).await,
            CallbackAction::ImageGraph => self.send_image_graph(api, &callback).await,
        };

        match result {
            Ok(()) if early_toast.is_none() => self.answer(api, &callback, None).await,
            Ok(()) => {}
            Err(e) => {
                let error_key = match action {
                    CallbackAction::ViewNote(_) => "error-note-detail",
                    CallbackAction::LinkNote(_) => "error-link-start",
                    CallbackAction::CreateLink { .. } => "error-link-create",
                    CallbackAction::DeleteNote(_) => "delete-failed",
                    CallbackAction::BackToNotes => "error-notes-list",
                    CallbackAction::TextTree => "error-tree",
                    CallbackAction::ImageGraph => "error-graph",
                };

                if action == CallbackAction::TextTree {
                    self.report_failure(api, callback.chat_id, error_key, &e).await;
                } else {
                    error!(error = %e, error_key, "Callback failed");
                    let edit = MessageEdit::new(self.t(error_key));
                    if let Err(edit_error) = api.edit_message(callback.chat_id, callback.message_id, edit).await {
                        warn!(error = %edit_error, "Failed to show callback error");
                    }
                }

                if early_toast.is_none() {
                    self.answer(api, &callback, Some(self.t("callback-error"))).await;
                }
            }
        }
    }

    async fn answer(&self, api: &dyn BotApi, callback: &IncomingCallback, text: Option<String>) {
        if let Err(e) = api.answer_callback(&callback.id, text).await {
            warn!(error = %e, callback_id = %callback.id, "Failed to answer callback query");
        }
    }

    async fn edit(&self, api: &dyn BotApi, callback: &IncomingCallback, edit: MessageEdit) -> Result<()> {
        api.edit_message(callback.chat_id, callback.message_id, edit).await
    }

    fn back_to_note(&self, note_id: NoteId) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::default().button(InlineKeyboardButton::new(
            self.t("btn-back-to-note"),
            CallbackAction::ViewNote(note_id).to_string(),
        ))
    }

    fn back_to_list(&self) -> InlineKeyboardMarkup {
        InlineKeyboardMarkup::default().button(InlineKeyboardButton::new(
            self.t("btn-back-to-list"),
            CallbackAction::BackToNotes.to_string(),
        ))
    }

    async fn edit_note_detail(&self, api: &dyn BotApi, callback: &IncomingCallback, note_id: NoteId) -> Result<()> {
        let Some(note) = self.store.get_note(note_id, callback.user_id).await? else {
            return self.edit(api, callback, MessageEdit::new(self.t("note-not-found"))).await;
        };
        let linked = self.store.linked_notes(note.id).await?;
        let (text, keyboard) = views::note_detail(&self.i18n, self.locale, &note, &linked);
        self.edit(api, callback, MessageEdit::new(text).html().markup(keyboard)).await
    }

    async fn edit_notes_list(&self, api: &dyn BotApi, callback: &IncomingCallback) -> Result<()> {
        let notes = self.store.list_notes(callback.user_id).await?;
        let edit = if notes.is_empty() {
            MessageEdit::new(self.t("notes-empty"))
        } else {
            let (text, keyboard) = views::notes_list(&self.i18n, self.locale, &notes);
            MessageEdit::new(text).markup(keyboard)
        };
        self.edit(api, callback, edit).await
    }

    async fn start_linking(&self, api: &dyn BotApi, callback: &IncomingCallback, from: NoteId) -> Result<()> {
        let notes = self.store.list_notes(callback.user_id).await?;
        if notes.len() < 2 {
            return self.edit(api, callback, MessageEdit::new(self.t("link-not-enough"))).await;
        }
        if !notes.iter().any(|note| note.id == from) {
            return self.edit(api, callback, MessageEdit::new(self.t("note-not-found"))).await;
        }

        let already_linked: HashSet<NoteId> = self
            .store
            .linked_notes(from)
            .await?
            .into_iter()
            .map(|note| note.id)
            .collect();
        let candidates: Vec<_> = notes
            .into_iter()
            .filter(|note| note.id != from && !already_linked.contains(&note.id))
            .collect();

        let edit = if candidates.is_empty() {
            MessageEdit::new(self.t("link-no-candidates")).markup(self.back_to_note(from))
        } else {
            MessageEdit::new(self.t("link-choose")).markup(views::link_picker(&self.i18n, self.locale, from, &candidates))
        };
        self.edit(api, callback, edit).await
    }

    async fn create_link(&self, api: &dyn BotApi, callback: &IncomingCallback, from: NoteId, to: NoteId) -> Result<()> {
        let outcome = self.store.add_link(callback.user_id, from, to).await?;
        info!(%from, %to, ?outcome, "Link requested");

        let key = match outcome {
            LinkOutcome::Created => "link-created",
            LinkOutcome::AlreadyLinked => "link-exists",
            LinkOutcome::SelfLink => "link-self",
            LinkOutcome::NotFound => "link-note-missing",
        };
        let edit = MessageEdit::new(self.t(key));
        let edit = if outcome == LinkOutcome::NotFound {
            edit.markup(self.back_to_list())
        } else {
            edit.markup(self.back_to_note(from))
        };
        self.edit(api, callback, edit).await
    }

    async fn delete_note(&self, api: &dyn BotApi, callback: &IncomingCallback, note_id: NoteId) -> Result<()> {
        let deleted = self.store.delete_note(note_id, callback.user_id).await?;
        info!(%note_id, deleted, "Note deletion requested");

        let key = if deleted { "delete-success" } else { "delete-failed" };
        self.edit(api, callback, MessageEdit::new(self.t(key)).markup(self.back_to_list()))
            .await
    }

    async fn send_image_graph(&self, api: &dyn BotApi, callback: &IncomingCallback) -> Result<()> {
        let chat_id = callback.chat_id;
        let data = self.store.graph_data(callback.user_id).await?;
        if data.notes.is_empty() {
            return self.edit(api, callback, MessageEdit::new(self.t("graph-empty"))).await;
        }

        let status = api
            .send_message(chat_id, OutgoingMessage::new(self.t("graph-rendering")))
            .await?;

        let graph = note_graph(data);
        let renderer = Arc::clone(&self.renderer);
        let rendered = tokio::task::spawn_blocking(move || renderer.render(&graph))
            .await
            .map_err(|e| ZettelError::graph_with_source("Graph render task failed", e))
            .and_then(|result| result);

        self.delete_quietly(api, chat_id, status).await;

        match rendered {
            Ok(png) => {
                info!(%chat_id, bytes = png.len(), "Graph image rendered");
                let caption = self.with_main_keyboard(self.t("graph-caption")).html();
                api.send_photo(chat_id, png, caption).await?;
                self.delete_quietly(api, chat_id, callback.message_id).await;
                Ok(())
            }
            Err(e) => {
                error!(%chat_id, error = %e, "Graph rendering failed");
                self.edit(api, callback, MessageEdit::new(self.t("graph-render-failed")))
                    .await
            }
        }
    }

    async fn delete_quietly(&self, api: &dyn BotApi, chat_id: ChatId, message_id: MessageId) {
        if let Err(e) = api.delete_message(chat_id, message_id).await {
            warn!(%chat_id, %message_id, error = %e, "Failed to delete message");
        }
    }
}

fn note_graph(data: GraphData) -> NoteGraph {
    NoteGraph::new(data.notes, data.links)
}
