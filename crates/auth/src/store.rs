//! Persistence contracts consumed by the token and auth services.
//!
//! Every mutation is keyed: users by id, sessions by user id, action tokens by
//! (user id, kind). Nothing here spans more than one store.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{ActionKind, ActionToken, Session, User, UserId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// User records, owned by the surrounding application
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `Conflict` when the email is taken.
    async fn create(&self, user: User) -> StoreResult<User>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Replace a stored user. Returns `None` when no such user exists.
    async fn update(&self, user: User) -> StoreResult<Option<User>>;
}

/// At most one refresh-token record per user
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create the user's session or overwrite its refresh token
    async fn upsert(&self, user_id: UserId, refresh_token: &str) -> StoreResult<Session>;

    async fn find_by_token(&self, refresh_token: &str) -> StoreResult<Option<Session>>;

    /// Returns the number of removed records (0 or 1)
    async fn delete_by_token(&self, refresh_token: &str) -> StoreResult<u64>;
}

/// Zero or more pending action tokens per user
#[async_trait]
pub trait ActionTokenStore: Send + Sync {
    async fn create(&self, user_id: UserId, kind: ActionKind, token: &str) -> StoreResult<ActionToken>;

    /// Delete every pending record of (user, kind) and create the new one as a
    /// single step. Returns the new record and the number of superseded ones.
    async fn replace(&self, user_id: UserId, kind: ActionKind, token: &str) -> StoreResult<(ActionToken, u64)>;

    /// Remove and return the record holding this token. Of two concurrent
    /// callers with the same token at most one gets `Some`.
    async fn take_by_token(&self, token: &str) -> StoreResult<Option<ActionToken>>;

    async fn delete_by_user_and_kind(&self, user_id: UserId, kind: ActionKind) -> StoreResult<u64>;
}
