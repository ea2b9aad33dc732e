//! Plain-text dump of the notes database for the `inspect` subcommand.

use std::io::Write;

use zettel_common::{format_note_datetime, truncate_chars};
use zettel_store::NoteStore;

use crate::error::BotResult;

const CONTENT_PREVIEW: usize = 60;

/// Write every note and link in the store to `out`
pub async fn write_report<W: Write>(store: &NoteStore, out: &mut W) -> BotResult<()> {
    let notes = store.all_notes().await?;
    let links = store.all_links().await?;

    writeln!(out, "Notes ({}):", notes.len())?;
    for note in &notes {
        writeln!(
            out,
            "  #{} [user {}] {} ({})",
            note.id,
            note.user_id,
            note.title,
            format_note_datetime(note.created_at)
        )?;
        if !note.content.is_empty() {
            writeln!(out, "      {}", truncate_chars(&note.content, CONTENT_PREVIEW))?;
        }
        if let Some(tags) = &note.tags {
            writeln!(out, "      tags: {tags}")?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Links ({}):", links.len())?;
    for link in &links {
        writeln!(out, "  #{} <-> #{}", link.from_note_id, link.to_note_id)?;
    }

    Ok(())
}
