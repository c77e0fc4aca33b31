use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, CodecError, Result};
use crate::model::{Account, Role, Status, User, UserId};

/// Claims carried by access and refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub id: UserId,
    pub email: String,
    pub role: Role,
    pub account: Account,
    pub status: Status,
}

impl From<&User> for SessionClaims {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            account: user.account,
            status: user.status,
        }
    }
}

/// Claims carried by activation and password-reset tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ActionClaims {
    pub id: UserId,
    pub email: String,
}

impl From<&User> for ActionClaims {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

/// A payload together with its registered claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims<T> {
    #[serde(flatten)]
    pub payload: T,
    /// Unique per issuance, so two tokens minted in the same second differ
    pub jti: Uuid,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl<T> Claims<T> {
    /// Wrap a payload expiring `expires_in_seconds` from now
    pub fn new(payload: T, expires_in_seconds: i64) -> Self {
        let now = Utc::now();
        let expiration = now + Duration::seconds(expires_in_seconds);

        Self {
            payload,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Check if the token is expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Sign a payload into a compact HS256 token
///
/// # Arguments
/// * `payload` - The claims to embed
/// * `secret` - The secret key for signing the token
/// * `expires_in_seconds` - Token lifetime in seconds
pub fn sign<T: Serialize>(payload: &T, secret: &str, expires_in_seconds: i64) -> Result<String> {
    let claims = Claims::new(payload, expires_in_seconds);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry of a token in one pass and return its claims
///
/// # Arguments
/// * `token` - The token to verify
/// * `secret` - The secret key the token is expected to be signed with
pub fn verify<T: DeserializeOwned>(token: &str, secret: &str) -> std::result::Result<Claims<T>, CodecError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let token_data = decode::<Claims<T>>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => CodecError::Expired,
        ErrorKind::InvalidSignature => CodecError::BadSignature,
        _ => CodecError::Malformed,
    })?;

    let claims = token_data.claims;

    if claims.is_expired() {
        return Err(CodecError::Expired);
    }

    Ok(claims)
}
