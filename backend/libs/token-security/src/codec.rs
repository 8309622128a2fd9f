//! JWT token generation and validation using HS256
//!
//! Claims carry exactly one principal id and one role tag. All
//! timestamps are whole-second Unix epoch values; a token whose `exp`
//! equals the current second is already expired.

use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal ID)
    pub sub: String,
    /// Role tag: "client", "staff", "dealership" or "admin"
    pub role: String,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    pub fn principal_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not verify")]
    InvalidSignature,

    #[error("token expired")]
    Expired,

    #[error("token is not a well-formed credential")]
    Malformed,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Stateless mint/parse pair bound to the process-wide signing secret.
///
/// Rotating the secret invalidates every outstanding token; that is a
/// documented side effect, not something this codec mitigates.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Mint a token for `principal_id` issued now.
    pub fn mint(&self, principal_id: Uuid, role: &str) -> Result<String, TokenError> {
        self.mint_at(principal_id, role, Utc::now().timestamp())
    }

    /// Mint a token with an explicit `iat`. Expiry is always
    /// `iat + ttl`. Used by tests to fabricate old or expired tokens.
    pub fn mint_at(
        &self,
        principal_id: Uuid,
        role: &str,
        issued_at: i64,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: principal_id.to_string(),
            role: role.to_string(),
            iat: issued_at,
            exp: issued_at + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the decoded claims.
    ///
    /// Expiry is checked here with `now >= exp` rather than through
    /// jsonwebtoken's leeway-based validation, so the boundary second
    /// counts as expired. Revocation is deliberately not consulted.
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        if Utc::now().timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}
