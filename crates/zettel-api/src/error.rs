//! HTTP error responses with a `{"detail": ...}` body

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;
use zettel_common::ZettelError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(&'static str),

    /// Body or path that does not match the expected shape
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Storage failure; `detail` is what the client sees
    #[error("{detail}: {source}")]
    Internal {
        detail: &'static str,
        #[source]
        source: ZettelError,
    },
}

impl ApiError {
    pub const fn internal(detail: &'static str, source: ZettelError) -> Self {
        Self::Internal { detail, source }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            Self::NotFound(detail) => detail.to_string(),
            Self::InvalidRequest(detail) => detail,
            Self::Internal { detail, source } => {
                error!(error = %source, detail, "Request failed");
                detail.to_string()
            }
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::NotFound("User not found").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::InvalidRequest("bad".to_string()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::internal("Failed to create user", ZettelError::database("locked")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_internal_hides_source_from_client() {
        let response = ApiError::internal("Failed to create user", ZettelError::database("disk I/O error")).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"detail": "Failed to create user"}));
    }
}
