use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::AppError;

/// Lifetime of every issued token.
pub const TOKEN_TTL_SECONDS: i64 = 60 * 60;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the owning user's id.
    pub sub: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// The token could not be trusted: bad signature, malformed, or expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidToken(pub String);

impl fmt::Display for InvalidToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "invalid token: {}", self.0)
    }
}

impl std::error::Error for InvalidToken {}

/// Issues and verifies signed, time-limited identity tokens (HS256).
///
/// The signing key is handed in at construction; nothing is read from the
/// environment here.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact: a token is rejected the second it runs out.
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token for `owner_id`, valid for one hour from now.
    pub fn issue(&self, owner_id: Uuid) -> Result<String, AppError> {
        self.issue_at(owner_id, Utc::now())
    }

    /// Issues a token as if the current time were `issued_at`.
    pub fn issue_at(&self, owner_id: Uuid, issued_at: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            sub: owner_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(TOKEN_TTL_SECONDS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies the signature and expiry of `token` and returns the owner id it names.
    pub fn verify(&self, token: &str) -> Result<Uuid, InvalidToken> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.sub)
            .map_err(|e| InvalidToken(e.to_string()))
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}
