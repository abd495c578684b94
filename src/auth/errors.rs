//! Authentication error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Internal auth failure kinds, distinguishable for logging only. The
/// response body stays generic so callers cannot probe which step failed.
#[derive(Debug)]
pub enum AuthErrorKind {
    MissingToken,
    InvalidToken,
    UserNotFound,
    InsufficientRole,
    DatabaseError,
}

#[derive(Debug)]
pub struct AuthError {
    pub(super) kind: AuthErrorKind,
}

impl AuthError {
    pub(super) fn new(kind: AuthErrorKind) -> Self {
        Self { kind }
    }

    fn status_code(&self) -> StatusCode {
        match self.kind {
            AuthErrorKind::MissingToken
            | AuthErrorKind::InvalidToken
            | AuthErrorKind::UserNotFound => StatusCode::UNAUTHORIZED,
            AuthErrorKind::InsufficientRole => StatusCode::FORBIDDEN,
            AuthErrorKind::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self.kind {
            AuthErrorKind::MissingToken | AuthErrorKind::InvalidToken => {
                "Couldn't validate token"
            }
            AuthErrorKind::UserNotFound => "Couldn't find user",
            AuthErrorKind::InsufficientRole => {
                "You are not authorized to access this resource"
            }
            AuthErrorKind::DatabaseError => "Database error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        #[derive(serde::Serialize)]
        struct ErrorResponse {
            error: &'static str,
        }

        (
            self.status_code(),
            Json(ErrorResponse {
                error: self.message(),
            }),
        )
            .into_response()
    }
}
