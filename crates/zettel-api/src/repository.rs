//! Users table access

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};
use zettel_common::{Result, ZettelError};

use crate::models::{User, UserCreate};

const MEMORY_PATH: &str = ":memory:";

/// Repository of bot users over a SQLite pool
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
    database_path: String,
}

impl UserRepository {
    /// Open (creating if needed) the users database
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Opening users database");

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| {
                ZettelError::database_with_source(
                    format!("Failed to open database: {}", path.display()),
                    e,
                )
            })?;

        Self::from_pool(pool, path.display().to_string()).await
    }

    /// A private in-memory database for tests
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // one connection for the lifetime of the pool, or the data is gone
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::from_pool(pool, MEMORY_PATH.to_string()).await
    }

    async fn from_pool(pool: SqlitePool, database_path: String) -> Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id INTEGER PRIMARY KEY,
                username TEXT,
                first_name TEXT,
                last_name TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool, database_path })
    }

    /// Path the repository was opened with
    pub fn database_path(&self) -> &str {
        &self.database_path
    }

    /// Insert a user or update the names of an existing one.
    ///
    /// The first `created_at` of a user is kept.
    pub async fn add_user(&self, user: &UserCreate) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, first_name, last_name)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                username = excluded.username,
                first_name = excluded.first_name,
                last_name = excluded.last_name
            "#,
        )
        .bind(user.user_id)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .execute(&self.pool)
        .await?;

        debug!(user_id = user.user_id, "User upserted");
        Ok(())
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT user_id, username, first_name, last_name, created_at FROM users WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// All users, newest first
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(
            "SELECT user_id, username, first_name, last_name, created_at FROM users \
             ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(user_from_row).collect()
    }

    /// Remove a user; `false` when there was no such user
    pub async fn delete_user(&self, user_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_users(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User> {
    let created_at: Option<NaiveDateTime> = row.try_get("created_at")?;
    Ok(User {
        user_id: row.try_get("user_id")?,
        username: row.try_get("username")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(user_id: i64, username: &str) -> UserCreate {
        UserCreate {
            user_id,
            username: Some(username.to_string()),
            first_name: Some("First".to_string()),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_created_at() {
        let repo = UserRepository::in_memory().await.unwrap();
        repo.add_user(&new_user(1, "before")).await.unwrap();

        sqlx::query("UPDATE users SET created_at = '2020-01-01 00:00:00' WHERE user_id = 1")
            .execute(&repo.pool)
            .await
            .unwrap();
        repo.add_user(&new_user(1, "after")).await.unwrap();

        let user = repo.get_user(1).await.unwrap().unwrap();
        assert_eq!(user.username.as_deref(), Some("after"));
        assert_eq!(
            user.created_at.unwrap().to_string(),
            "2020-01-01 00:00:00"
        );
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = UserRepository::in_memory().await.unwrap();
        repo.add_user(&new_user(10, "old")).await.unwrap();
        repo.add_user(&new_user(5, "new")).await.unwrap();
        sqlx::query("UPDATE users SET created_at = '2020-01-01 00:00:00' WHERE user_id = 10")
            .execute(&repo.pool)
            .await
            .unwrap();

        let ids: Vec<i64> = repo.list_users().await.unwrap().iter().map(|u| u.user_id).collect();
        assert_eq!(ids, vec![5, 10]);
    }

    #[tokio::test]
    async fn test_delete_reports_missing_user() {
        let repo = UserRepository::in_memory().await.unwrap();
        repo.add_user(&new_user(3, "x")).await.unwrap();

        assert!(repo.delete_user(3).await.unwrap());
        assert!(!repo.delete_user(3).await.unwrap());
        assert!(repo.get_user(3).await.unwrap().is_none());
        assert_eq!(repo.database_path(), ":memory:");
    }
}
