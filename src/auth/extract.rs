//! Token extraction and the store-role authorization gate.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, Method, header, request::Parts};
use tracing::debug;

use super::cookie::get_cookie;
use super::errors::{AuthError, AuthErrorKind};
use crate::db::{Database, UserRole};
use crate::jwt::{AccessClaims, JwtConfig};

/// Trait for router state types that carry the auth backend.
pub trait AuthState {
    fn jwt(&self) -> &JwtConfig;
    fn db(&self) -> &Database;
}

/// Macro to implement [`AuthState`] for state structs with the standard
/// `jwt: Arc<JwtConfig>` and `db: Database` fields.
#[macro_export]
macro_rules! impl_auth_state {
    ($state_type:ty) => {
        impl $crate::auth::AuthState for $state_type {
            fn jwt(&self) -> &$crate::jwt::JwtConfig {
                &self.jwt
            }
            fn db(&self) -> &$crate::db::Database {
                &self.db
            }
        }
    };
}

/// Pull a token out of a request.
///
/// POST requests may authenticate with an `Authorization: Bearer` header,
/// which takes precedence over the named cookie; every other method is
/// cookie-only. When neither is present this returns an empty string rather
/// than failing: the empty token is rejected downstream by validation.
pub fn extract_token(method: &Method, headers: &HeaderMap, cookie_name: &str) -> String {
    if method == Method::POST {
        if let Some(value) = headers.get(header::AUTHORIZATION) {
            if let Ok(value) = value.to_str() {
                if let Some(token) = value.strip_prefix("Bearer ") {
                    return token.to_string();
                }
            }
        }
    }

    get_cookie(headers, cookie_name)
        .unwrap_or_default()
        .to_string()
}

/// Extractor guarding store-only endpoints.
///
/// Validates the access token, then re-fetches the user by subject so a
/// deleted account is locked out before the token expires, and finally
/// requires the `store` role.
pub struct StoreAuth(pub AccessClaims);

impl<S> FromRequestParts<S> for StoreAuth
where
    S: AuthState + Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.method, &parts.headers, super::ACCESS_COOKIE_NAME);

        let claims = state.jwt().validate_access_token(&token).map_err(|e| {
            debug!(error = %e, "store access token rejected");
            AuthError::new(AuthErrorKind::InvalidToken)
        })?;

        let user = state
            .db()
            .users()
            .get_by_id(&claims.sub)
            .await
            .map_err(|e| {
                tracing::error!("Failed to look up user for store access: {}", e);
                AuthError::new(AuthErrorKind::DatabaseError)
            })?
            .ok_or_else(|| AuthError::new(AuthErrorKind::UserNotFound))?;

        if user.role != UserRole::Store {
            return Err(AuthError::new(AuthErrorKind::InsufficientRole));
        }

        Ok(StoreAuth(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_post_prefers_bearer_header_over_cookie() {
        let headers = headers(&[
            ("authorization", "Bearer header-token"),
            ("cookie", "access_token=cookie-token"),
        ]);

        assert_eq!(
            extract_token(&Method::POST, &headers, "access_token"),
            "header-token"
        );
    }

    #[test]
    fn test_non_post_ignores_bearer_header() {
        let headers = headers(&[
            ("authorization", "Bearer header-token"),
            ("cookie", "access_token=cookie-token"),
        ]);

        assert_eq!(
            extract_token(&Method::GET, &headers, "access_token"),
            "cookie-token"
        );
        assert_eq!(
            extract_token(&Method::PUT, &headers, "access_token"),
            "cookie-token"
        );
        assert_eq!(
            extract_token(&Method::DELETE, &headers, "access_token"),
            "cookie-token"
        );
    }

    #[test]
    fn test_missing_token_yields_empty_string() {
        // Extraction itself must not fail; validation rejects the empty
        // token downstream.
        assert_eq!(
            extract_token(&Method::POST, &HeaderMap::new(), "access_token"),
            ""
        );
    }

    #[test]
    fn test_non_bearer_authorization_falls_back_to_cookie() {
        let headers = headers(&[
            ("authorization", "Basic dXNlcjpwdw=="),
            ("cookie", "refresh_token=cookie-token"),
        ]);

        assert_eq!(
            extract_token(&Method::POST, &headers, "refresh_token"),
            "cookie-token"
        );
    }
}
