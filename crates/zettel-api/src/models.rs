//! Request and response bodies

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamps are rendered the way SQLite's `CURRENT_TIMESTAMP` stores them
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A stored row of the `users` table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

/// Body of `POST /users/`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UserCreate {
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user
                .created_at
                .map(|at| at.format(TIMESTAMP_FORMAT).to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<UserResponse>,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreated {
    pub message: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_users: i64,
    pub database_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    /// RFC 3339
    pub timestamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use zettel_common::test_utils::fixed_datetime;

    #[test]
    fn test_created_at_uses_sqlite_format() {
        let user = User {
            user_id: 1,
            username: Some("ann".to_string()),
            first_name: None,
            last_name: None,
            created_at: Some(fixed_datetime(2024, 3, 9, 14, 5)),
        };
        let response = UserResponse::from(user);
        assert_eq!(response.created_at.as_deref(), Some("2024-03-09 14:05:00"));
    }

    #[test]
    fn test_optional_names_may_be_omitted() {
        let body: UserCreate = serde_json::from_str(r#"{"user_id": 5}"#).unwrap();
        assert_eq!(body.user_id, 5);
        assert!(body.username.is_none());
        assert!(body.last_name.is_none());
    }
}
