use proptest::prelude::*;
use zettel_common::{split_long_message, truncate_chars, MESSAGE_PART_LIMIT};

fn without_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[test]
fn long_tree_splits_below_telegram_limit() {
    let line = "├── Заметка о методе Zettelkasten\n";
    let text = line.repeat(400);
    let parts = split_long_message(&text, MESSAGE_PART_LIMIT);

    assert!(parts.len() > 1);
    for part in &parts {
        assert!(part.chars().count() <= MESSAGE_PART_LIMIT);
        assert!(part.starts_with("├──"), "parts are cut at line boundaries");
    }
}

proptest! {
    #[test]
    fn split_parts_respect_limit(text in "[a-zа-я \n]{0,300}", max in 1usize..60) {
        for part in split_long_message(&text, max) {
            prop_assert!(part.chars().count() <= max);
            prop_assert!(!part.is_empty());
        }
    }

    #[test]
    fn split_keeps_all_visible_characters(text in "[a-zа-я \n]{0,300}", max in 1usize..60) {
        let parts = split_long_message(&text, max);
        prop_assert_eq!(without_whitespace(&parts.concat()), without_whitespace(&text));
    }

    #[test]
    fn truncate_never_exceeds_limit_plus_ellipsis(text in "\\PC{0,80}", max in 0usize..40) {
        let truncated = truncate_chars(&text, max);
        prop_assert!(truncated.chars().count() <= max + 3);
        if text.chars().count() <= max {
            prop_assert_eq!(truncated, text);
        } else {
            prop_assert!(truncated.ends_with("..."));
        }
    }
}
