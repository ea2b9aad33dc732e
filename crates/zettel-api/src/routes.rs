//! HTTP routes of the users service

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::Method;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;
use crate::models::{
    HealthResponse, MessageResponse, StatsResponse, StatusResponse, UserCreate, UserCreated, UserResponse,
    UsersResponse,
};
use crate::repository::UserRepository;

const USER_NOT_FOUND: &str = "User not found";

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub users: UserRepository,
}

impl AppState {
    pub const fn new(users: UserRepository) -> Self {
        Self { users }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// All routes with tracing and permissive CORS
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/users/", get(list_users).post(create_user))
        .route("/users/:user_id", get(get_user).delete(delete_user))
        .route("/stats/", get(stats))
        .route("/health/", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Telegram Bot API Server".to_string(),
        status: "running".to_string(),
    })
}

async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<UserCreate>, JsonRejection>,
) -> ApiResult<UserCreated> {
    let Json(user) = body?;
    state
        .users
        .add_user(&user)
        .await
        .map_err(|e| ApiError::internal("Failed to create user", e))?;

    info!(user_id = user.user_id, "User stored");
    Ok(Json(UserCreated {
        message: "User created successfully".to_string(),
        user_id: user.user_id,
    }))
}

async fn get_user(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<UserResponse> {
    let Path(user_id) = user_id?;
    let user = state
        .users
        .get_user(user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to get user", e))?
        .ok_or(ApiError::NotFound(USER_NOT_FOUND))?;

    Ok(Json(user.into()))
}

async fn list_users(State(state): State<AppState>) -> ApiResult<UsersResponse> {
    let users = state
        .users
        .list_users()
        .await
        .map_err(|e| ApiError::internal("Failed to list users", e))?;
    let total = state
        .users
        .count_users()
        .await
        .map_err(|e| ApiError::internal("Failed to list users", e))?;

    Ok(Json(UsersResponse {
        users: users.into_iter().map(UserResponse::from).collect(),
        total,
    }))
}

async fn delete_user(
    State(state): State<AppState>,
    user_id: Result<Path<i64>, PathRejection>,
) -> ApiResult<MessageResponse> {
    let Path(user_id) = user_id?;
    let deleted = state
        .users
        .delete_user(user_id)
        .await
        .map_err(|e| ApiError::internal("Failed to delete user", e))?;

    if !deleted {
        return Err(ApiError::NotFound(USER_NOT_FOUND));
    }

    info!(user_id, "User deleted");
    Ok(Json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

async fn stats(State(state): State<AppState>) -> ApiResult<StatsResponse> {
    let total_users = state
        .users
        .count_users()
        .await
        .map_err(|e| ApiError::internal("Failed to get stats", e))?;

    Ok(Json(StatsResponse {
        total_users,
        database_path: state.users.database_path().to_string(),
    }))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
