//! Message texts and inline keyboards built from stored notes

use zettel_common::{
    escape_html, format_note_date, format_note_datetime, split_long_message, truncate_chars, NoteId,
    MESSAGE_PART_LIMIT,
};
use zettel_i18n::{fluent_args, I18nManager, Locale};
use zettel_store::{LinkedNote, Note, NoteSummary};

use crate::api::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::callback::CallbackAction;

/// Telegram's hard limit for one message
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;
/// Note buttons in the list and link picker; Telegram caps inline keyboards
pub const MAX_NOTE_BUTTONS: usize = 50;

const BUTTON_TITLE_LIMIT: usize = 30;
const PREVIEW_LIMIT: usize = 50;
const LINKED_TITLE_LIMIT: usize = 50;
const MAX_LINKED_TITLES: usize = 30;
const DETAIL_TITLE_LIMIT: usize = 200;
const DETAIL_TAGS_LIMIT: usize = 200;
const ELLIPSIS: &str = "...";

/// Header text and one button per note, newest first
pub fn notes_list(i18n: &I18nManager, locale: Locale, notes: &[NoteSummary]) -> (String, InlineKeyboardMarkup) {
    let text = if notes.len() > MAX_NOTE_BUTTONS {
        i18n.text_with(
            "notes-header-truncated",
            locale,
            &fluent_args!["count" => notes.len(), "shown" => MAX_NOTE_BUTTONS],
        )
    } else {
        i18n.text_with("notes-header", locale, &fluent_args!["count" => notes.len()])
    };

    let keyboard = notes
        .iter()
        .take(MAX_NOTE_BUTTONS)
        .fold(InlineKeyboardMarkup::default(), |keyboard, note| {
            let label = i18n.text_with(
                "note-button",
                locale,
                &fluent_args![
                    "title" => truncate_chars(&note.title, BUTTON_TITLE_LIMIT),
                    "date" => format_note_date(note.created_at),
                ],
            );
            keyboard.button(InlineKeyboardButton::new(
                label,
                CallbackAction::ViewNote(note.id).to_string(),
            ))
        });

    (text, keyboard)
}

/// HTML detail view of one note with its actions
pub fn note_detail(
    i18n: &I18nManager,
    locale: Locale,
    note: &Note,
    linked: &[LinkedNote],
) -> (String, InlineKeyboardMarkup) {
    let tags = note
        .tags
        .as_deref()
        .map_or_else(
            || i18n.text("note-no-tags", locale),
            |tags| escape_html_within(tags, DETAIL_TAGS_LIMIT),
        );
    let title = escape_html_within(&note.title, DETAIL_TITLE_LIMIT);

    let mut links_section = String::new();
    if !linked.is_empty() {
        links_section.push_str("\n\n");
        links_section.push_str(&i18n.text("note-links-header", locale));
        for link in linked.iter().take(MAX_LINKED_TITLES) {
            links_section.push_str("\n• ");
            links_section.push_str(&escape_html_within(&link.title, LINKED_TITLE_LIMIT));
        }
        if linked.len() > MAX_LINKED_TITLES {
            links_section.push_str(&format!("\n+{}", linked.len() - MAX_LINKED_TITLES));
        }
    }

    let render = |content: String| {
        let body = i18n.text_with(
            "note-detail",
            locale,
            &fluent_args![
                "title" => title.clone(),
                "content" => content,
                "tags" => tags.clone(),
                "created" => format_note_datetime(note.created_at),
                "links" => linked.len(),
            ],
        );
        format!("{body}{links_section}")
    };

    let overhead = render(String::new()).chars().count();
    let budget = TELEGRAM_MESSAGE_LIMIT.saturating_sub(overhead);
    let text = render(escape_html_within(&note.content, budget));

    let keyboard = InlineKeyboardMarkup::default()
        .row(vec![
            InlineKeyboardButton::new(
                i18n.text("btn-link", locale),
                CallbackAction::LinkNote(note.id).to_string(),
            ),
            InlineKeyboardButton::new(
                i18n.text("btn-delete", locale),
                CallbackAction::DeleteNote(note.id).to_string(),
            ),
        ])
        .button(InlineKeyboardButton::new(
            i18n.text("btn-back-to-list", locale),
            CallbackAction::BackToNotes.to_string(),
        ));

    (text, keyboard)
}

/// Escape `raw` for HTML, cutting it so the result has at most `budget` characters
fn escape_html_within(raw: &str, budget: usize) -> String {
    let escaped = escape_html(raw);
    if escaped.chars().count() <= budget {
        return escaped;
    }

    let limit = budget.saturating_sub(ELLIPSIS.len());
    let mut out = String::new();
    let mut used = 0;
    for c in raw.chars() {
        let piece = escape_html(c.encode_utf8(&mut [0; 4]));
        let width = piece.chars().count();
        if used + width > limit {
            break;
        }
        out.push_str(&piece);
        used += width;
    }
    out.push_str(ELLIPSIS);
    out
}

/// Buttons to pick the other end of a new link, plus a way back
pub fn link_picker(
    i18n: &I18nManager,
    locale: Locale,
    from: NoteId,
    candidates: &[NoteSummary],
) -> InlineKeyboardMarkup {
    candidates
        .iter()
        .take(MAX_NOTE_BUTTONS)
        .fold(InlineKeyboardMarkup::default(), |keyboard, note| {
            let label = i18n.text_with(
                "link-target-button",
                locale,
                &fluent_args!["title" => truncate_chars(&note.title, BUTTON_TITLE_LIMIT)],
            );
            keyboard.button(InlineKeyboardButton::new(
                label,
                CallbackAction::CreateLink { from, to: note.id }.to_string(),
            ))
        })
        .button(InlineKeyboardButton::new(
            i18n.text("btn-cancel", locale),
            CallbackAction::ViewNote(from).to_string(),
        ))
}

/// Plain-text search results split into sendable parts
pub fn search_results(i18n: &I18nManager, locale: Locale, query: &str, notes: &[Note]) -> Vec<String> {
    let no_tags = i18n.text("search-no-tags", locale);
    let mut text = i18n.text_with("search-results-header", locale, &fluent_args!["query" => query]);
    text.push_str("\n\n");

    for note in notes {
        text.push_str(&format!("📄 {}\n", note.title));
        if !note.content.is_empty() {
            text.push_str(&format!("   {}\n", truncate_chars(&note.content, PREVIEW_LIMIT)));
        }
        text.push_str(&format!("   🏷️ {}\n", note.tags.as_deref().unwrap_or(&no_tags)));
        text.push_str(&format!("   👁️ /view_{}\n\n", note.id));
    }

    split_long_message(text.trim_end(), MESSAGE_PART_LIMIT)
}

/// The rendered forest with headers, split into sendable parts
pub fn tree_messages(i18n: &I18nManager, locale: Locale, tree: &str) -> Vec<String> {
    if tree.chars().count() <= MESSAGE_PART_LIMIT {
        return vec![format!("{}\n\n{tree}", i18n.text("tree-header", locale))];
    }

    let parts = split_long_message(tree, MESSAGE_PART_LIMIT);
    let total = parts.len();
    parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| {
            let header = i18n.text_with(
                "tree-part-header",
                locale,
                &fluent_args!["part" => i + 1, "total" => total],
            );
            format!("{header}\n\n{part}")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zettel_common::test_utils::fixed_datetime;
    use zettel_common::UserId;

    fn i18n() -> I18nManager {
        I18nManager::new(Locale::Russian).unwrap()
    }

    fn note(id: i64, title: &str, content: &str, tags: Option<&str>) -> Note {
        Note {
            id: NoteId(id),
            user_id: UserId(1),
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.map(str::to_string),
            created_at: fixed_datetime(2024, 3, 9, 14, 5),
        }
    }

    fn summary(id: i64, title: &str) -> NoteSummary {
        NoteSummary {
            id: NoteId(id),
            title: title.to_string(),
            created_at: fixed_datetime(2024, 3, 9, 14, 5),
        }
    }

    #[test]
    fn test_notes_list_buttons() {
        let notes = [summary(2, "A title that is definitely longer than thirty"), summary(1, "Short")];
        let (text, keyboard) = notes_list(&i18n(), Locale::Russian, &notes);

        assert!(text.starts_with("📚 Ваши заметки (2):"));
        let buttons: Vec<_> = keyboard.buttons().collect();
        assert_eq!(buttons[0].text, "📄 A title that is definitely lon... (2024-03-09)");
        assert_eq!(buttons[0].callback_data, "view_note_2");
        assert_eq!(buttons[1].text, "📄 Short (2024-03-09)");
    }

    #[test]
    fn test_notes_list_is_capped() {
        let notes: Vec<_> = (1..=60).rev().map(|i| summary(i, &format!("Note {i}"))).collect();
        let (text, keyboard) = notes_list(&i18n(), Locale::English, &notes);
        assert_eq!(keyboard.buttons().count(), MAX_NOTE_BUTTONS);
        assert!(text.contains("60"));
        assert!(text.contains("50"));
    }

    #[test]
    fn test_detail_escapes_user_text() {
        let n = note(5, "<script>", "a & b", Some("x<y"));
        let linked = [LinkedNote {
            id: NoteId(6),
            title: "Other <note>".into(),
        }];
        let (text, keyboard) = note_detail(&i18n(), Locale::Russian, &n, &linked);

        assert!(text.contains("<b>&lt;script&gt;</b>"));
        assert!(text.contains("a &amp; b"));
        assert!(text.contains("x&lt;y"));
        assert!(text.contains("2024-03-09 14:05"));
        assert!(text.contains("• Other &lt;note&gt;"));

        let data: Vec<_> = keyboard.buttons().map(|b| b.callback_data.as_str()).collect();
        assert_eq!(data, vec!["link_note_5", "delete_note_5", "back_to_notes"]);
    }

    #[test]
    fn test_detail_without_tags_or_links() {
        let (text, _) = note_detail(&i18n(), Locale::Russian, &note(1, "T", "C", None), &[]);
        assert!(text.contains("<b>Теги:</b> нет"));
        assert!(!text.contains("<b>Связи:</b>"));
    }

    #[test]
    fn test_detail_fits_telegram_limit() {
        let long = "&".repeat(5000);
        let (text, _) = note_detail(&i18n(), Locale::Russian, &note(1, "Long", &long, None), &[]);
        assert!(text.chars().count() <= TELEGRAM_MESSAGE_LIMIT);
        assert!(text.contains("&amp;..."));
        assert!(!text.contains("&am..."));
    }

    #[test]
    fn test_detail_with_huge_tags_title_and_links_fits() {
        let title = "<".repeat(1000);
        let tags = "<&>".repeat(1400);
        let linked: Vec<_> = (2..60)
            .map(|id| LinkedNote {
                id: NoteId(id),
                title: "&".repeat(300),
            })
            .collect();
        let (text, _) = note_detail(
            &i18n(),
            Locale::Russian,
            &note(1, &title, &"x".repeat(4000), Some(&tags)),
            &linked,
        );

        assert!(text.chars().count() <= TELEGRAM_MESSAGE_LIMIT);
        assert!(text.contains("xxx"));
        assert!(text.contains("&lt;&amp;&gt;"));
    }

    #[test]
    fn test_detail_with_long_plain_tags_fits() {
        let tags = "a".repeat(4000);
        let (text, _) = note_detail(&i18n(), Locale::Russian, &note(1, "T", "body", Some(&tags)), &[]);

        assert!(text.chars().count() <= TELEGRAM_MESSAGE_LIMIT);
        assert!(text.contains("body"));
        assert!(text.contains(&format!("{}...", "a".repeat(DETAIL_TAGS_LIMIT - 3))));
    }

    #[test]
    fn test_link_picker_targets_and_cancel() {
        let markup = link_picker(&i18n(), Locale::Russian, NoteId(1), &[summary(2, "Two"), summary(3, "Three")]);
        let buttons: Vec<_> = markup.buttons().collect();
        assert_eq!(buttons.len(), 3);
        assert_eq!(buttons[0].text, "🔗 Two");
        assert_eq!(buttons[0].callback_data, "create_link_1_2");
        assert_eq!(buttons[2].callback_data, "view_note_1");
    }

    #[test]
    fn test_search_results_text() {
        let notes = [note(3, "Rust", &"x".repeat(60), None), note(4, "Go", "short", Some("lang"))];
        let parts = search_results(&i18n(), Locale::Russian, "lang", &notes);

        assert_eq!(parts.len(), 1);
        let text = &parts[0];
        assert!(text.starts_with("🔍 Результаты поиска по запросу 'lang':"));
        assert!(text.contains(&format!("   {}...\n", "x".repeat(50))));
        assert!(text.contains("🏷️ нет тегов"));
        assert!(text.contains("🏷️ lang"));
        assert!(text.contains("👁️ /view_3"));
        assert!(text.ends_with("👁️ /view_4"));
    }

    #[test]
    fn test_short_tree_is_one_message() {
        let parts = tree_messages(&i18n(), Locale::Russian, "📄 A\n└── B");
        assert_eq!(parts, vec!["📊 Дерево заметок:\n\n📄 A\n└── B".to_string()]);
    }

    #[test]
    fn test_long_tree_is_split_with_part_headers() {
        let tree: String = (0..600).map(|i| format!("├── note number {i}\n")).collect();
        let parts = tree_messages(&i18n(), Locale::Russian, &tree);

        assert!(parts.len() > 1);
        assert!(parts[0].starts_with(&format!("📊 Дерево заметок (часть 1/{}):", parts.len())));
        for part in &parts {
            assert!(part.chars().count() < TELEGRAM_MESSAGE_LIMIT);
        }
    }
}
