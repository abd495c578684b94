//! Cookie transport and request authentication.
//!
//! Dual-token scheme: short-lived signed access tokens (15 minutes,
//! stateless) and long-lived opaque refresh tokens (60 days, persisted and
//! revocable). Both travel as HttpOnly cookies; POST requests may instead
//! carry a bearer header, which then takes precedence.

mod cookie;
mod errors;
mod extract;

pub use cookie::{
    ACCESS_COOKIE_NAME, CookieOptions, REFRESH_COOKIE_NAME, SameSite, build_cookie, clear_cookie,
    get_cookie,
};
pub use errors::{AuthError, AuthErrorKind};
pub use extract::{AuthState, StoreAuth, extract_token};
