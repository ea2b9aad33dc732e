//! Text and time helpers used when composing chat messages.

use chrono::NaiveDateTime;

/// Telegram rejects messages longer than 4096 characters; parts are kept below it.
pub const MESSAGE_PART_LIMIT: usize = 4000;

/// `YYYY-MM-DD`, used on note list buttons.
pub fn format_note_date(created_at: NaiveDateTime) -> String {
    created_at.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD HH:MM`, used on the note detail view.
pub fn format_note_datetime(created_at: NaiveDateTime) -> String {
    created_at.format("%Y-%m-%d %H:%M").to_string()
}

/// Keeps the first `max_chars` characters and appends `...` when anything was cut.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((byte_index, _)) => format!("{}...", &input[..byte_index]),
        None => input.to_string(),
    }
}

/// Escapes text for Telegram's HTML parse mode.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Splits `text` into parts of at most `max_chars` characters.
///
/// Each cut happens at the last newline inside the window, or exactly at the
/// window edge when the window has none. Whitespace at the start of the
/// following part is dropped.
pub fn split_long_message(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut parts = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_chars {
        let window_end = rest
            .char_indices()
            .nth(max_chars)
            .map_or(rest.len(), |(index, _)| index);
        let cut = match rest[..window_end].rfind('\n') {
            Some(index) if index > 0 => index,
            _ => window_end,
        };
        parts.push(rest[..cut].to_string());
        rest = rest[cut..].trim_start();
    }

    if !rest.is_empty() {
        parts.push(rest.to_string());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_note_dates() {
        let created = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 59)
            .unwrap();
        assert_eq!(format_note_date(created), "2024-03-09");
        assert_eq!(format_note_datetime(created), "2024-03-09 07:05");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Short", 20), "Short");
        assert_eq!(truncate_chars("exactly5", 8), "exactly5");
        assert_eq!(truncate_chars("Zettelkasten", 6), "Zettel...");
        // multi-byte characters are counted, not bytes
        assert_eq!(truncate_chars("Заметка о связях", 7), "Заметка...");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("a < b && c > \"d\""),
            "a &lt; b &amp;&amp; c &gt; &quot;d&quot;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_split_prefers_newlines() {
        let text = "line one\nline two\nline three";
        let parts = split_long_message(text, 12);
        assert_eq!(parts, vec!["line one", "line two", "line three"]);
    }

    #[test]
    fn test_split_hard_cut_without_newline() {
        let parts = split_long_message("abcdefghij", 4);
        assert_eq!(parts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_split_short_and_empty() {
        assert_eq!(split_long_message("tiny", 100), vec!["tiny"]);
        assert!(split_long_message("", 100).is_empty());
    }
}
