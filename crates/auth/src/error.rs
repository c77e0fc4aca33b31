use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User with email {0} already exists")]
    AlreadyExists(String),

    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Token is not valid")]
    TokenInvalid,

    #[error("{0} not found")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token generation failed: {0}")]
    TokenGeneration(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Discriminant of an [`AuthError`], for callers that only branch on the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    AlreadyExists,
    InvalidCredentials,
    Unauthorized,
    TokenInvalid,
    NotFound,
    Validation,
    Internal,
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            AuthError::InvalidCredentials => ErrorKind::InvalidCredentials,
            AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::TokenInvalid => ErrorKind::TokenInvalid,
            AuthError::NotFound(_) => ErrorKind::NotFound,
            AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::Hashing(_) | AuthError::TokenGeneration(_) | AuthError::Store(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Why a signed credential failed verification.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("token expired")]
    Expired,

    #[error("token signature does not match")]
    BadSignature,

    #[error("token is malformed")]
    Malformed,
}

pub type Result<T> = std::result::Result<T, AuthError>;
