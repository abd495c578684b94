//! User signup endpoint.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde::Deserialize;
use tracing::error;

use super::error::{ApiError, ResultExt};
use crate::db::{Database, User, UserRole};

#[derive(Clone)]
pub struct UsersState {
    pub db: Database,
}

pub fn router(state: UsersState) -> Router {
    Router::new().route("/", post(create_user)).with_state(state)
}

#[derive(Deserialize)]
struct CreateUserRequest {
    email: String,
    password: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

async fn create_user(
    State(state): State<UsersState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let password_hash = bcrypt::hash(&payload.password, bcrypt::DEFAULT_COST).map_err(|e| {
        error!("Failed to hash password: {}", e);
        ApiError::internal("Couldn't hash password")
    })?;

    // Role is assigned at creation and never client-controlled.
    let user = state
        .db
        .users()
        .create(
            &payload.email,
            &password_hash,
            &payload.first_name,
            &payload.last_name,
            UserRole::User,
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::conflict("Email is already registered")
            } else {
                ApiError::db_error("Failed to create user", e)
            }
        })?;

    Ok((StatusCode::CREATED, Json(user)))
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(
        e.as_database_error().map(|d| d.kind()),
        Some(sqlx::error::ErrorKind::UniqueViolation)
    )
}
