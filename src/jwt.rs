//! Access token generation/validation and opaque refresh token minting.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::db::UserRole;

/// Issuer claim embedded in every access token.
pub const TOKEN_ISSUER: &str = "tillpoint-api";

/// Access token duration: 15 minutes
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 15 * 60;

/// Refresh session duration: 60 days
pub const REFRESH_SESSION_DURATION_SECS: u64 = 60 * 24 * 60 * 60;

/// JWT claims for access tokens. Self-contained: nothing here requires a
/// database lookup to validate, the role is a snapshot trusted until expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Issuer, always [`TOKEN_ISSUER`]
    pub iss: String,
    /// Subject (user UUID)
    pub sub: String,
    /// User role snapshot
    pub role: UserRole,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

/// Configuration for JWT operations.
#[derive(Clone)]
pub struct JwtConfig {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// Result of generating an access token.
#[derive(Debug, Clone)]
pub struct AccessTokenResult {
    /// The signed JWT string
    pub token: String,
    /// Token duration in seconds
    pub duration: u64,
}

impl JwtConfig {
    /// Create a new JWT configuration with the given secret.
    /// An empty secret cannot sign anything useful and is rejected.
    pub fn new(secret: &[u8]) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    /// Generate a short-lived access token for a user.
    pub fn generate_access_token(
        &self,
        user_id: &str,
        role: UserRole,
    ) -> Result<AccessTokenResult, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| JwtError::TimeError)?
            .as_secs();

        let claims = AccessClaims {
            iss: TOKEN_ISSUER.to_string(),
            sub: user_id.to_string(),
            role,
            iat: now,
            exp: now + ACCESS_TOKEN_DURATION_SECS,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Signing)?;

        Ok(AccessTokenResult {
            token,
            duration: ACCESS_TOKEN_DURATION_SECS,
        })
    }

    /// Validate and decode an access token.
    ///
    /// Signature, issuer, and expiry are all checked. The error variants are
    /// distinguishable for logging; callers at the API boundary collapse all
    /// of them into a single 401.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[TOKEN_ISSUER]);

        let token_data =
            jsonwebtoken::decode::<AccessClaims>(token, &self.decoding_key, &validation).map_err(
                |e| match e.kind() {
                    ErrorKind::ExpiredSignature => JwtError::Expired,
                    ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                    ErrorKind::InvalidIssuer => JwtError::WrongIssuer,
                    _ => JwtError::Malformed,
                },
            )?;

        Ok(token_data.claims)
    }
}

/// Generate an opaque refresh token: 256 bits from a CSPRNG, hex encoded.
/// Collisions are negligible at this entropy, so the value doubles as the
/// session's primary key.
pub fn generate_refresh_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Errors that can occur during token operations.
#[derive(Debug)]
pub enum JwtError {
    /// Signing key was empty
    EmptySecret,
    /// Error signing the token
    Signing(jsonwebtoken::errors::Error),
    /// Token is past its expiry
    Expired,
    /// Signature does not verify
    InvalidSignature,
    /// Issuer claim does not match ours
    WrongIssuer,
    /// Token could not be parsed, or other claim mismatch
    Malformed,
    /// System time error
    TimeError,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::EmptySecret => write!(f, "Signing secret is empty"),
            JwtError::Signing(e) => write!(f, "Failed to sign token: {}", e),
            JwtError::Expired => write!(f, "Token expired"),
            JwtError::InvalidSignature => write!(f, "Invalid token signature"),
            JwtError::WrongIssuer => write!(f, "Unexpected token issuer"),
            JwtError::Malformed => write!(f, "Malformed token"),
            JwtError::TimeError => write!(f, "System time error"),
        }
    }
}

impl std::error::Error for JwtError {}
