//! Bearer-token issuance and validation.
//!
//! Tokens are self-contained HS256 JWTs carrying the holder's email and a
//! 15-minute expiry. Nothing is stored server-side, so logout cannot revoke
//! a token early; it only clears the client's cookie.

use crate::services::{ServiceError, ServiceResult};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Token validity window in seconds.
pub const TOKEN_TTL_SECS: u64 = 15 * 60;

/// Claims embedded in issued tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the holder's email.
    pub sub: String,
    /// Expiry (seconds since epoch).
    pub exp: usize,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a token for the given identity.
    pub fn mint(&self, email: &str) -> ServiceResult<String> {
        let exp = jsonwebtoken::get_current_timestamp() as usize + TOKEN_TTL_SECS as usize;
        let claims = Claims {
            sub: email.to_string(),
            exp,
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|err| {
            tracing::debug!("token encoding failed: {err}");
            ServiceError::TokenCreation
        })
    }

    /// Validate signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> ServiceResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| {
                tracing::debug!("token rejected: {err}");
                ServiceError::InvalidToken
            })
    }
}
