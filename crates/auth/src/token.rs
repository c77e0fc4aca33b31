use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::error::{AuthError, CodecError, Result};
use crate::jwt::{sign, verify, ActionClaims, SessionClaims};
use crate::model::{ActionKind, Session, User, UserId};
use crate::store::{ActionTokenStore, SessionStore};

/// The four credential classes, each signed under its own secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialClass {
    Access,
    Refresh,
    Activate,
    Forgot,
}

impl From<ActionKind> for CredentialClass {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Activate => CredentialClass::Activate,
            ActionKind::Forgot => CredentialClass::Forgot,
        }
    }
}

/// Secret and lifetime of one credential class
#[derive(Clone)]
pub struct SigningKey {
    secret: String,
    ttl_seconds: i64,
}

impl SigningKey {
    pub fn new(secret: impl Into<String>, ttl_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub fn sign<T: Serialize>(&self, payload: &T) -> Result<String> {
        sign(payload, &self.secret, self.ttl_seconds)
    }

    pub fn verify<T: serde::de::DeserializeOwned>(&self, token: &str) -> std::result::Result<T, CodecError> {
        verify::<T>(token, &self.secret).map(|claims| claims.payload)
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("secret", &"[REDACTED]")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish()
    }
}

/// Secrets and lifetimes for every credential class
#[derive(Debug, Clone)]
pub struct TokenSettings {
    pub access: SigningKey,
    pub refresh: SigningKey,
    pub activate: SigningKey,
    pub forgot: SigningKey,
}

impl TokenSettings {
    /// 30 minute access tokens, 7 day refresh and action tokens
    pub fn with_default_ttls(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        activate_secret: impl Into<String>,
        forgot_secret: impl Into<String>,
    ) -> Self {
        const WEEK: i64 = 7 * 24 * 60 * 60;
        Self {
            access: SigningKey::new(access_secret, 30 * 60),
            refresh: SigningKey::new(refresh_secret, WEEK),
            activate: SigningKey::new(activate_secret, WEEK),
            forgot: SigningKey::new(forgot_secret, WEEK),
        }
    }

    pub fn key(&self, class: CredentialClass) -> &SigningKey {
        match class {
            CredentialClass::Access => &self.access,
            CredentialClass::Refresh => &self.refresh,
            CredentialClass::Activate => &self.activate,
            CredentialClass::Forgot => &self.forgot,
        }
    }
}

/// Access/refresh token pair handed to the client
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues, rotates and revokes credentials on top of the session and
/// action-token stores
pub struct TokenService {
    settings: TokenSettings,
    sessions: Arc<dyn SessionStore>,
    action_tokens: Arc<dyn ActionTokenStore>,
}

impl TokenService {
    pub fn new(
        settings: TokenSettings,
        sessions: Arc<dyn SessionStore>,
        action_tokens: Arc<dyn ActionTokenStore>,
    ) -> Self {
        Self {
            settings,
            sessions,
            action_tokens,
        }
    }

    pub fn settings(&self) -> &TokenSettings {
        &self.settings
    }

    /// Sign an access/refresh pair for the user. Nothing is persisted.
    pub fn issue_session_tokens(&self, user: &User) -> Result<TokenPair> {
        let claims = SessionClaims::from(user);

        Ok(TokenPair {
            access_token: self.settings.access.sign(&claims)?,
            refresh_token: self.settings.refresh.sign(&claims)?,
        })
    }

    /// Make `refresh_token` the user's only redeemable refresh token
    pub async fn persist_session(&self, refresh_token: &str, user_id: UserId) -> Result<Session> {
        Ok(self.sessions.upsert(user_id, refresh_token).await?)
    }

    /// Issue a pair and persist its refresh half.
    ///
    /// If the process dies between the two steps the client never receives the
    /// pair, and a pair that was signed but not persisted cannot be refreshed.
    pub async fn start_session(&self, user: &User) -> Result<TokenPair> {
        let tokens = self.issue_session_tokens(user)?;
        self.persist_session(&tokens.refresh_token, user.id).await?;
        tracing::debug!(user_id = %user.id, "session started");
        Ok(tokens)
    }

    /// Remove the session holding this refresh token. Unknown tokens are a no-op.
    pub async fn end_session(&self, refresh_token: &str) -> Result<u64> {
        Ok(self.sessions.delete_by_token(refresh_token).await?)
    }

    pub async fn find_session(&self, refresh_token: &str) -> Result<Option<Session>> {
        Ok(self.sessions.find_by_token(refresh_token).await?)
    }

    pub fn verify_access(&self, access_token: &str) -> std::result::Result<SessionClaims, CodecError> {
        self.settings.access.verify(access_token)
    }

    /// Claims of a valid refresh token, `None` for anything else
    pub fn verify_refresh(&self, refresh_token: &str) -> Option<SessionClaims> {
        match self.settings.refresh.verify(refresh_token) {
            Ok(claims) => Some(claims),
            Err(reason) => {
                tracing::debug!(%reason, "refresh token rejected");
                None
            }
        }
    }

    /// Sign an action token, record it as the only pending one of its kind and
    /// return it for delivery
    pub async fn issue_action_token(&self, user: &User, kind: ActionKind) -> Result<String> {
        let token = self
            .settings
            .key(kind.into())
            .sign(&ActionClaims::from(user))?;

        let (_, superseded) = self.action_tokens.replace(user.id, kind, &token).await?;

        tracing::debug!(user_id = %user.id, %kind, superseded, "action token issued");
        Ok(token)
    }

    /// Signature and expiry check under the kind's secret
    pub fn verify_action_token(&self, token: &str, kind: ActionKind) -> Result<ActionClaims> {
        self.settings
            .key(kind.into())
            .verify(token)
            .map_err(|reason| {
                tracing::debug!(%kind, %reason, "action token rejected");
                AuthError::TokenInvalid
            })
    }

    /// Verify an action token and consume its pending record. A token redeems
    /// at most once, even when presented by concurrent requests.
    pub async fn redeem_action_token(&self, token: &str, kind: ActionKind) -> Result<ActionClaims> {
        let claims = self.verify_action_token(token, kind)?;

        let pending = self
            .action_tokens
            .take_by_token(token)
            .await?
            .is_some_and(|record| record.kind == kind && record.user_id == claims.id);

        if !pending {
            tracing::debug!(user_id = %claims.id, %kind, "action token already used or superseded");
            return Err(AuthError::TokenInvalid);
        }

        Ok(claims)
    }

    pub async fn clear_action_tokens(&self, user_id: UserId, kind: ActionKind) -> Result<u64> {
        Ok(self.action_tokens.delete_by_user_and_kind(user_id, kind).await?)
    }
}
