//! Reply keyboards and the menu buttons they produce

use zettel_i18n::{I18nManager, Locale};

use crate::api::{InlineKeyboardButton, InlineKeyboardMarkup, ReplyKeyboardMarkup};
use crate::callback::CallbackAction;

/// A reply keyboard button, recognized by its localized label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuButton {
    NewNote,
    MyNotes,
    Search,
    Tree,
    Graph,
    Help,
    AllCommands,
    MainMenu,
    Cancel,
}

impl MenuButton {
    pub const ALL: [Self; 9] = [
        Self::NewNote,
        Self::MyNotes,
        Self::Search,
        Self::Tree,
        Self::Graph,
        Self::Help,
        Self::AllCommands,
        Self::MainMenu,
        Self::Cancel,
    ];

    pub const fn message_key(self) -> &'static str {
        match self {
            Self::NewNote => "btn-new-note",
            Self::MyNotes => "btn-my-notes",
            Self::Search => "btn-search",
            Self::Tree => "btn-tree",
            Self::Graph => "btn-graph",
            Self::Help => "btn-help",
            Self::AllCommands => "btn-all-commands",
            Self::MainMenu => "btn-main-menu",
            Self::Cancel => "btn-cancel",
        }
    }

    pub fn label(self, i18n: &I18nManager, locale: Locale) -> String {
        i18n.text(self.message_key(), locale)
    }

    /// The button whose label equals `text`
    pub fn from_text(i18n: &I18nManager, locale: Locale, text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL
            .into_iter()
            .find(|button| button.label(i18n, locale) == text)
    }
}

fn labels(i18n: &I18nManager, locale: Locale, buttons: &[MenuButton]) -> Vec<String> {
    buttons.iter().map(|b| b.label(i18n, locale)).collect()
}

/// Keyboard shown after most replies
pub fn main_keyboard(i18n: &I18nManager, locale: Locale) -> ReplyKeyboardMarkup {
    use MenuButton::{AllCommands, Graph, Help, MyNotes, NewNote, Search, Tree};
    ReplyKeyboardMarkup::from_labels(
        labels(i18n, locale, &[NewNote, MyNotes, Search, Tree, Graph, Help, AllCommands]),
        2,
    )
}

/// Keyboard of raw slash commands plus a way back
pub fn commands_keyboard(i18n: &I18nManager, locale: Locale) -> ReplyKeyboardMarkup {
    let mut buttons: Vec<String> = ["/new", "/notes", "/search", "/tree", "/graph", "/help"]
        .into_iter()
        .map(str::to_string)
        .collect();
    buttons.push(MenuButton::MainMenu.label(i18n, locale));
    ReplyKeyboardMarkup::from_labels(buttons, 2)
}

/// Shown while the note wizard waits for input
pub fn cancel_keyboard(i18n: &I18nManager, locale: Locale) -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup::from_labels(labels(i18n, locale, &[MenuButton::Cancel]), 1)
}

/// Shown while waiting for a search query
pub fn back_to_menu_keyboard(i18n: &I18nManager, locale: Locale) -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup::from_labels(labels(i18n, locale, &[MenuButton::MainMenu]), 1)
}

/// Choice between the text tree and the image graph
pub fn visualization_keyboard(i18n: &I18nManager, locale: Locale) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::default().row(vec![
        InlineKeyboardButton::new(
            i18n.text("btn-text-tree", locale),
            CallbackAction::TextTree.to_string(),
        ),
        InlineKeyboardButton::new(
            i18n.text("btn-image-graph", locale),
            CallbackAction::ImageGraph.to_string(),
        ),
    ])
}
