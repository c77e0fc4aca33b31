//! In-memory store adapters.
//!
//! Used by the server binary and tests. Each store guards its map with a single
//! `RwLock`, which gives the atomic upsert/delete-by-key the services rely on.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::model::{ActionKind, ActionToken, Session, User, UserId};
use crate::store::{ActionTokenStore, SessionStore, StoreError, StoreResult, UserStore};

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, user: User) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email {} is taken", user.email)));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update(&self, user: User) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<UserId, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored session records
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn upsert(&self, user_id: UserId, refresh_token: &str) -> StoreResult<Session> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(user_id)
            .and_modify(|s| {
                s.refresh_token = refresh_token.to_string();
                s.updated_at = chrono::Utc::now();
            })
            .or_insert_with(|| Session::new(user_id, refresh_token.to_string()));
        Ok(session.clone())
    }

    async fn find_by_token(&self, refresh_token: &str) -> StoreResult<Option<Session>> {
        Ok(self
            .sessions
            .read()
            .await
            .values()
            .find(|s| s.refresh_token == refresh_token)
            .cloned())
    }

    async fn delete_by_token(&self, refresh_token: &str) -> StoreResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.refresh_token != refresh_token);
        Ok((before - sessions.len()) as u64)
    }
}

#[derive(Debug, Default)]
pub struct MemoryActionTokenStore {
    tokens: RwLock<Vec<ActionToken>>,
}

impl MemoryActionTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending records of one kind for a user
    pub async fn pending(&self, user_id: UserId, kind: ActionKind) -> usize {
        self.tokens
            .read()
            .await
            .iter()
            .filter(|t| t.user_id == user_id && t.kind == kind)
            .count()
    }
}

#[async_trait]
impl ActionTokenStore for MemoryActionTokenStore {
    async fn create(&self, user_id: UserId, kind: ActionKind, token: &str) -> StoreResult<ActionToken> {
        let record = ActionToken::new(user_id, kind, token.to_string());
        self.tokens.write().await.push(record.clone());
        Ok(record)
    }

    async fn replace(&self, user_id: UserId, kind: ActionKind, token: &str) -> StoreResult<(ActionToken, u64)> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| !(t.user_id == user_id && t.kind == kind));
        let superseded = (before - tokens.len()) as u64;

        let record = ActionToken::new(user_id, kind, token.to_string());
        tokens.push(record.clone());
        Ok((record, superseded))
    }

    async fn take_by_token(&self, token: &str) -> StoreResult<Option<ActionToken>> {
        let mut tokens = self.tokens.write().await;
        Ok(tokens
            .iter()
            .position(|t| t.token == token)
            .map(|index| tokens.swap_remove(index)))
    }

    async fn delete_by_user_and_kind(&self, user_id: UserId, kind: ActionKind) -> StoreResult<u64> {
        let mut tokens = self.tokens.write().await;
        let before = tokens.len();
        tokens.retain(|t| !(t.user_id == user_id && t.kind == kind));
        Ok((before - tokens.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Registration, Role};
    use uuid::Uuid;

    fn user(email: &str) -> User {
        let registration = Registration {
            name: "John".to_string(),
            email: email.to_string(),
            phone: "0501234567".to_string(),
            password: "Qwerty123".to_string(),
            avatar: None,
        };
        User::new_with_role(&registration, "digest".to_string(), Role::Customer)
    }

    #[tokio::test]
    async fn test_upsert_keeps_single_record() {
        let store = MemorySessionStore::new();
        let user_id = Uuid::new_v4();

        store.upsert(user_id, "first").await.unwrap();
        let session = store.upsert(user_id, "second").await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(session.refresh_token, "second");
        assert_eq!(store.find_by_token("second").await.unwrap().unwrap().user_id, user_id);
        assert!(store.find_by_token("first").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_by_token_is_idempotent() {
        let store = MemorySessionStore::new();
        store.upsert(Uuid::new_v4(), "token").await.unwrap();

        assert_eq!(store.delete_by_token("token").await.unwrap(), 1);
        assert!(store.find_by_token("token").await.unwrap().is_none());
        assert_eq!(store.delete_by_token("token").await.unwrap(), 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_action_tokens_accumulate_until_deleted() {
        let store = MemoryActionTokenStore::new();
        let user_id = Uuid::new_v4();

        store.create(user_id, ActionKind::Forgot, "one").await.unwrap();
        store.create(user_id, ActionKind::Forgot, "two").await.unwrap();
        store.create(user_id, ActionKind::Activate, "three").await.unwrap();
        assert_eq!(store.pending(user_id, ActionKind::Forgot).await, 2);

        let removed = store
            .delete_by_user_and_kind(user_id, ActionKind::Forgot)
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.pending(user_id, ActionKind::Forgot).await, 0);
        assert_eq!(store.pending(user_id, ActionKind::Activate).await, 1);
    }

    #[tokio::test]
    async fn test_replace_leaves_one_pending_record() {
        let store = MemoryActionTokenStore::new();
        let user_id = Uuid::new_v4();

        store.create(user_id, ActionKind::Forgot, "one").await.unwrap();
        store.create(user_id, ActionKind::Forgot, "two").await.unwrap();
        store.create(user_id, ActionKind::Activate, "three").await.unwrap();

        let (record, superseded) = store.replace(user_id, ActionKind::Forgot, "four").await.unwrap();
        assert_eq!(record.token, "four");
        assert_eq!(superseded, 2);
        assert_eq!(store.pending(user_id, ActionKind::Forgot).await, 1);
        assert_eq!(store.pending(user_id, ActionKind::Activate).await, 1);
    }

    #[tokio::test]
    async fn test_concurrent_replace_keeps_a_single_record() {
        let store = MemoryActionTokenStore::new();
        let user_id = Uuid::new_v4();

        let (first, second) = tokio::join!(
            store.replace(user_id, ActionKind::Forgot, "one"),
            store.replace(user_id, ActionKind::Forgot, "two"),
        );
        first.unwrap();
        second.unwrap();

        assert_eq!(store.pending(user_id, ActionKind::Forgot).await, 1);
    }

    #[tokio::test]
    async fn test_take_by_token_consumes_once() {
        let store = MemoryActionTokenStore::new();
        let user_id = Uuid::new_v4();
        store.create(user_id, ActionKind::Activate, "token").await.unwrap();

        let (first, second) = tokio::join!(store.take_by_token("token"), store.take_by_token("token"));
        let taken = [first.unwrap(), second.unwrap()];

        assert_eq!(taken.iter().filter(|record| record.is_some()).count(), 1);
        assert_eq!(store.pending(user_id, ActionKind::Activate).await, 0);
        assert!(store.take_by_token("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_user_email_is_unique() {
        let store = MemoryUserStore::new();
        store.create(user("a@x.com")).await.unwrap();

        let result = store.create(user("a@x.com")).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_missing_user_returns_none() {
        let store = MemoryUserStore::new();
        assert!(store.update(user("ghost@x.com")).await.unwrap().is_none());

        let mut stored = store.create(user("a@x.com")).await.unwrap();
        stored.role = Role::Admin;
        store.update(stored.clone()).await.unwrap();
        assert_eq!(store.find_by_id(stored.id).await.unwrap().unwrap().role, Role::Admin);
    }
}
