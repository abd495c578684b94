//! Authentication endpoints.
//!
//! - POST `/login` - Verify credentials, issue access + refresh tokens
//! - POST `/refresh` - Exchange a refresh token for a new access token
//! - POST `/revoke` - Revoke a refresh token and clear cookies
//! - GET `/session` - Check whether the access token is still valid

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, header::SET_COOKIE},
    response::{AppendHeaders, IntoResponse},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};

use super::error::{ApiError, ResultExt};
use crate::auth::{
    ACCESS_COOKIE_NAME, CookieOptions, REFRESH_COOKIE_NAME, build_cookie, clear_cookie,
    extract_token,
};
use crate::db::{Database, User};
use crate::jwt::{JwtConfig, REFRESH_SESSION_DURATION_SECS, generate_refresh_token};

#[derive(Clone)]
pub struct AuthApiState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub cookies: CookieOptions,
}

pub fn router(state: AuthApiState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/revoke", post(revoke))
        .route("/session", get(session))
        .with_state(state)
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    #[serde(flatten)]
    user: User,
    token: String,
    refresh_token: String,
}

/// The one message both credential failures share, so callers cannot tell
/// an unknown email from a wrong password.
const BAD_CREDENTIALS: &str = "Incorrect email or password";

async fn login(
    State(state): State<AuthApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .users()
        .get_by_email(&payload.email)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

    let password_matches =
        bcrypt::verify(&payload.password, &user.password_hash).unwrap_or(false);
    if !password_matches {
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let access = state
        .jwt
        .generate_access_token(&user.id, user.role)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            ApiError::internal("Couldn't create access token")
        })?;

    let refresh_token = generate_refresh_token();
    state
        .db
        .sessions()
        .create(
            &refresh_token,
            &user.id,
            REFRESH_SESSION_DURATION_SECS as i64,
        )
        .await
        .db_err("Failed to save refresh session")?;

    let access_cookie = build_cookie(
        ACCESS_COOKIE_NAME,
        &access.token,
        access.duration,
        state.cookies,
    );
    let refresh_cookie = build_cookie(
        REFRESH_COOKIE_NAME,
        &refresh_token,
        REFRESH_SESSION_DURATION_SECS,
        state.cookies,
    );

    Ok((
        StatusCode::OK,
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        Json(LoginResponse {
            user,
            token: access.token,
            refresh_token,
        }),
    ))
}

#[derive(Serialize)]
struct RefreshResponse {
    token: String,
}

/// Issue a new access token from a refresh token. The refresh token itself
/// is not rotated; it stays valid until its own expiry or an explicit
/// revoke.
async fn refresh(
    State(state): State<AuthApiState>,
    method: Method,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = extract_token(&method, &headers, REFRESH_COOKIE_NAME);

    // A missing, expired, or revoked session all land here.
    let user = state
        .db
        .users()
        .get_by_refresh_token(&refresh_token)
        .await
        .db_err("Failed to look up refresh session")?
        .ok_or_else(|| ApiError::unauthorized("Couldn't get user for refresh token"))?;

    let access = state
        .jwt
        .generate_access_token(&user.id, user.role)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            ApiError::internal("Couldn't create access token")
        })?;

    let access_cookie = build_cookie(
        ACCESS_COOKIE_NAME,
        &access.token,
        access.duration,
        state.cookies,
    );

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, access_cookie)],
        Json(RefreshResponse {
            token: access.token,
        }),
    ))
}

/// Revoke a refresh session. Idempotent: revoking an unknown or
/// already-revoked token succeeds quietly.
async fn revoke(
    State(state): State<AuthApiState>,
    method: Method,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = extract_token(&method, &headers, REFRESH_COOKIE_NAME);

    state
        .db
        .sessions()
        .revoke(&refresh_token)
        .await
        .db_err("Failed to revoke session")?;

    let clear_access = clear_cookie(ACCESS_COOKIE_NAME, state.cookies);
    let clear_refresh = clear_cookie(REFRESH_COOKIE_NAME, state.cookies);

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([(SET_COOKIE, clear_access), (SET_COOKIE, clear_refresh)]),
    ))
}

/// Validate the access token without touching the database. Success or
/// failure only, no payload.
async fn session(
    State(state): State<AuthApiState>,
    method: Method,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_token(&method, &headers, ACCESS_COOKIE_NAME);

    state.jwt.validate_access_token(&token).map_err(|e| {
        debug!(error = %e, "session check failed");
        ApiError::unauthorized("Invalid session. Couldn't validate token")
    })?;

    Ok(StatusCode::OK)
}
