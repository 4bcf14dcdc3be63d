use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;
use crate::error::AppError;

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "jwt";

// HS256 secrets below this length are brute-forceable; refuse to start.
const MIN_SECRET_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// HS256 session-token codec.
///
/// Tokens are self-verifying and never stored server-side: validity is
/// signature + expiry, nothing else. Logout therefore only clears the
/// cookie; a captured token stays usable until its natural expiry.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_seconds: u64,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("TokenCodec")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_seconds: u64) -> Result<Self, ConfigError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(ConfigError::Weak("JWT_SECRET"));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in verify() against the caller-supplied clock;
        // the library still enforces signature and claim presence.
        validation.validate_exp = false;
        // These tokens carry no audience claim.
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        })
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Sign a token for `subject`, valid for the configured TTL from `now`.
    pub fn issue(&self, subject: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = SessionClaims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: now.timestamp() + self.ttl_seconds as i64,
        };

        let header = Header::new(Algorithm::HS256);
        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            error!(error = %e, "failed to sign session token");
            AppError::Internal
        })
    }

    /// Check signature and structure, then expiry against `now`.
    /// Returns the subject on success.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let data =
            jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;

        if now.timestamp() > data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims.sub)
    }

    /// `Set-Cookie` value installing the session.
    pub fn session_cookie(&self, token: &str) -> String {
        format!(
            "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
            SESSION_COOKIE, token, self.ttl_seconds
        )
    }

    /// `Set-Cookie` value discarding the session on the client.
    pub fn expired_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
            SESSION_COOKIE
        )
    }
}
