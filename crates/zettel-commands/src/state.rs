//! Per-chat note creation wizard state

use dashmap::DashMap;
use tracing::debug;
use zettel_common::ChatId;

/// Step of the note creation wizard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DialogueState {
    #[default]
    Idle,
    WaitingTitle,
    WaitingContent {
        title: String,
    },
    WaitingTags {
        title: String,
        content: String,
    },
}

impl DialogueState {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::WaitingTitle => "waiting_title",
            Self::WaitingContent { .. } => "waiting_content",
            Self::WaitingTags { .. } => "waiting_tags",
        }
    }
}

/// Wizard state of every chat; absent chats are idle
#[derive(Debug, Default)]
pub struct DialogueStore {
    states: DashMap<ChatId, DialogueState>,
}

impl DialogueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chat_id: ChatId) -> DialogueState {
        self.states
            .get(&chat_id)
            .map(|state| state.clone())
            .unwrap_or_default()
    }

    /// Store `state`; storing `Idle` forgets the chat
    pub fn set(&self, chat_id: ChatId, state: DialogueState) {
        debug!(%chat_id, state = state.name(), "Dialogue state changed");
        if state == DialogueState::Idle {
            self.states.remove(&chat_id);
        } else {
            self.states.insert(chat_id, state);
        }
    }

    /// Forget the chat, returning whether a wizard was in progress
    pub fn clear(&self, chat_id: ChatId) -> bool {
        self.states.remove(&chat_id).is_some()
    }

    /// Number of chats in the middle of the wizard
    pub fn active(&self) -> usize {
        self.states.len()
    }
}
