//! Cookie parsing and building for token transport.

use axum::http::header;

/// Cookie name for the access token (short-lived, 15 minutes).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (long-lived, 60 days).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// SameSite attribute for auth cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    None,
    Strict,
}

impl SameSite {
    fn as_str(&self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::None => "None",
            SameSite::Strict => "Strict",
        }
    }
}

/// Transport attributes shared by both auth cookies.
#[derive(Debug, Clone, Copy)]
pub struct CookieOptions {
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

impl CookieOptions {
    /// Derive cookie attributes from the frontend origin. An HTTPS origin
    /// means a cross-site deployment: Secure plus SameSite=None (which
    /// requires Secure). Plain HTTP is local development, where Lax works
    /// and None would be rejected by browsers.
    pub fn from_origin(frontend_origin: &str) -> Self {
        if frontend_origin.starts_with("https") {
            Self {
                secure: true,
                same_site: SameSite::None,
            }
        } else {
            Self {
                secure: false,
                same_site: SameSite::Lax,
            }
        }
    }
}

/// Build a Set-Cookie value for an auth token.
pub fn build_cookie(name: &str, value: &str, max_age_secs: u64, opts: CookieOptions) -> String {
    let secure = if opts.secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite={}; Path=/; Max-Age={}{}",
        name,
        value,
        opts.same_site.as_str(),
        max_age_secs,
        secure
    )
}

/// Build a Set-Cookie value that deletes an auth cookie.
pub fn clear_cookie(name: &str, opts: CookieOptions) -> String {
    let secure = if opts.secure { "; Secure" } else { "" };
    format!(
        "{}=; HttpOnly; SameSite={}; Path=/; Max-Age=0{}",
        name,
        opts.same_site.as_str(),
        secure
    )
}

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}
