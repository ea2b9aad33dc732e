//! Note and link queries

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};
use zettel_common::{NoteId, Result, UserId, ZettelError};

use crate::models::{GraphData, LinkOutcome, LinkedNote, NewNote, Note, NoteLink, NoteSummary};
use crate::schema;

/// Notes repository over a SQLite pool
#[derive(Debug, Clone)]
pub struct NoteStore {
    pool: SqlitePool,
}

impl NoteStore {
    /// Open (creating if needed) the database file and make sure the schema exists
    pub async fn connect(path: impl AsRef<Path>, max_connections: u32) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening notes database");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                ZettelError::database_with_source(
                    format!("Failed to open database: {}", path.display()),
                    e,
                )
            })?;

        Self::from_pool(pool).await
    }

    /// A private in-memory database, mostly for tests
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        // every connection to :memory: is a separate database, so keep exactly one forever
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the schema when missing
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        schema::initialize(&pool).await?;
        Ok(Self { pool })
    }

    /// Store a new note and return its id
    pub async fn add_note(&self, user_id: UserId, note: &NewNote) -> Result<NoteId> {
        let result = sqlx::query(
            "INSERT INTO notes (user_id, title, content, tags) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id.0)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.tags.as_deref())
        .execute(&self.pool)
        .await?;

        let id = NoteId(result.last_insert_rowid());
        info!(%user_id, note_id = %id, "Note created");
        Ok(id)
    }

    /// The user's notes, newest first
    pub async fn list_notes(&self, user_id: UserId) -> Result<Vec<NoteSummary>> {
        let rows = sqlx::query(
            "SELECT id, title, created_at FROM notes WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<NoteSummary> {
                Ok(NoteSummary {
                    id: NoteId(row.try_get("id")?),
                    title: row.try_get("title")?,
                    created_at: created_at(row)?,
                })
            })
            .collect()
    }

    /// A single note, only if it belongs to `user_id`
    pub async fn get_note(&self, note_id: NoteId, user_id: UserId) -> Result<Option<Note>> {
        let row = sqlx::query(
            "SELECT id, user_id, title, content, tags, created_at FROM notes WHERE id = ? AND user_id = ?",
        )
        .bind(note_id.0)
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(note_from_row).transpose()
    }

    /// Notes whose title, content or tags contain `query`, ignoring case
    ///
    /// Matching happens here rather than with `LIKE`, which only folds ASCII.
    pub async fn search_notes(&self, user_id: UserId, query: &str) -> Result<Vec<Note>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT id, user_id, title, content, tags, created_at FROM notes WHERE user_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut found = Vec::new();
        for row in &rows {
            let note = note_from_row(row)?;
            if note.matches(query) {
                found.push(note);
            }
        }

        debug!(%user_id, query, hits = found.len(), "Searched notes");
        Ok(found)
    }

    /// Link two of the user's notes
    pub async fn add_link(&self, user_id: UserId, from: NoteId, to: NoteId) -> Result<LinkOutcome> {
        if from == to {
            return Ok(LinkOutcome::SelfLink);
        }

        let mut tx = self.pool.begin().await?;

        let owned: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notes WHERE user_id = ? AND id IN (?, ?)",
        )
        .bind(user_id.0)
        .bind(from.0)
        .bind(to.0)
        .fetch_one(&mut *tx)
        .await?;

        if owned != 2 {
            warn!(%user_id, %from, %to, "Refusing link to a missing or foreign note");
            return Ok(LinkOutcome::NotFound);
        }

        let existing: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM note_links
            WHERE (from_note_id = ? AND to_note_id = ?)
               OR (from_note_id = ? AND to_note_id = ?)
            "#,
        )
        .bind(from.0)
        .bind(to.0)
        .bind(to.0)
        .bind(from.0)
        .fetch_one(&mut *tx)
        .await?;

        if existing > 0 {
            debug!(%from, %to, "Notes already linked");
            return Ok(LinkOutcome::AlreadyLinked);
        }

        sqlx::query("INSERT INTO note_links (from_note_id, to_note_id) VALUES (?, ?)")
            .bind(from.0)
            .bind(to.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(%user_id, %from, %to, "Notes linked");
        Ok(LinkOutcome::Created)
    }

    /// Notes linked to `note_id` in either direction, ordered by title
    pub async fn linked_notes(&self, note_id: NoteId) -> Result<Vec<LinkedNote>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title FROM notes
            WHERE id IN (
                SELECT to_note_id FROM note_links WHERE from_note_id = ?
                UNION
                SELECT from_note_id FROM note_links WHERE to_note_id = ?
            )
            ORDER BY title, id
            "#,
        )
        .bind(note_id.0)
        .bind(note_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<LinkedNote> {
                Ok(LinkedNote {
                    id: NoteId(row.try_get("id")?),
                    title: row.try_get("title")?,
                })
            })
            .collect()
    }

    /// Delete a note owned by `user_id` together with its links
    ///
    /// Returns `false` when there was no such note.
    pub async fn delete_note(&self, note_id: NoteId, user_id: UserId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<i64> = sqlx::query_scalar("SELECT id FROM notes WHERE id = ? AND user_id = ?")
            .bind(note_id.0)
            .bind(user_id.0)
            .fetch_optional(&mut *tx)
            .await?;

        if owned.is_none() {
            warn!(%user_id, %note_id, "Note to delete not found");
            return Ok(false);
        }

        let links = sqlx::query("DELETE FROM note_links WHERE from_note_id = ? OR to_note_id = ?")
            .bind(note_id.0)
            .bind(note_id.0)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(note_id.0)
            .bind(user_id.0)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            %user_id,
            %note_id,
            links_removed = links.rows_affected(),
            "Note deleted"
        );
        Ok(true)
    }

    /// The user's notes keyed by id and the links among them
    pub async fn graph_data(&self, user_id: UserId) -> Result<GraphData> {
        let note_rows = sqlx::query("SELECT id, title FROM notes WHERE user_id = ? ORDER BY id")
            .bind(user_id.0)
            .fetch_all(&self.pool)
            .await?;

        let link_rows = sqlx::query(
            r#"
            SELECT l.from_note_id, l.to_note_id
            FROM note_links l
            JOIN notes a ON a.id = l.from_note_id
            JOIN notes b ON b.id = l.to_note_id
            WHERE a.user_id = ? AND b.user_id = ?
            ORDER BY l.id
            "#,
        )
        .bind(user_id.0)
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;

        let mut data = GraphData::default();
        for row in &note_rows {
            data.notes.insert(NoteId(row.try_get("id")?), row.try_get("title")?);
        }
        for row in &link_rows {
            data.links.push((
                NoteId(row.try_get("from_note_id")?),
                NoteId(row.try_get("to_note_id")?),
            ));
        }

        debug!(%user_id, notes = data.notes.len(), links = data.links.len(), "Loaded graph data");
        Ok(data)
    }

    /// Every note of every user, oldest first
    pub async fn all_notes(&self) -> Result<Vec<Note>> {
        let rows = sqlx::query(
            "SELECT id, user_id, title, content, tags, created_at FROM notes ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(note_from_row).collect()
    }

    /// Every stored link row
    pub async fn all_links(&self) -> Result<Vec<NoteLink>> {
        let rows = sqlx::query(
            "SELECT id, from_note_id, to_note_id, created_at FROM note_links ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<NoteLink> {
                Ok(NoteLink {
                    id: row.try_get("id")?,
                    from_note_id: NoteId(row.try_get("from_note_id")?),
                    to_note_id: NoteId(row.try_get("to_note_id")?),
                    created_at: created_at(row)?,
                })
            })
            .collect()
    }

    /// Close the pool, waiting for checked-out connections
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn note_from_row(row: &SqliteRow) -> Result<Note> {
    Ok(Note {
        id: NoteId(row.try_get("id")?),
        user_id: UserId(row.try_get("user_id")?),
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        tags: row.try_get("tags")?,
        created_at: created_at(row)?,
    })
}

fn created_at(row: &SqliteRow) -> Result<NaiveDateTime> {
    let value: Option<NaiveDateTime> = row.try_get("created_at")?;
    Ok(value.unwrap_or_default())
}
