use sqlx::SqlitePool;
use tracing::debug;
use zettel_common::Result;

pub(crate) async fn initialize(pool: &SqlitePool) -> Result<()> {
    debug!("Initializing notes schema");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            tags TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS note_links (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            from_note_id INTEGER NOT NULL,
            to_note_id INTEGER NOT NULL,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (from_note_id) REFERENCES notes (id),
            FOREIGN KEY (to_note_id) REFERENCES notes (id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_notes_user ON notes(user_id, created_at)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_note_links_from ON note_links(from_note_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_note_links_to ON note_links(to_note_id)")
        .execute(pool)
        .await?;

    Ok(())
}
