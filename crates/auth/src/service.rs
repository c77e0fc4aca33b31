use std::sync::Arc;

use crate::{
    error::{AuthError, Result},
    mail::{MailMessage, MailTemplate, Mailer},
    model::{Account, ActionKind, Credentials, Registration, Role, Status, User, UserId},
    password::{hash_password_blocking, verify_password_blocking},
    store::{StoreError, UserStore},
    token::{TokenPair, TokenService},
    validation::{validate_password, validate_registration},
};

/// Tokens and user returned by every flow that opens a session
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub tokens: TokenPair,
    pub user: User,
}

/// Identity lifecycle: registration, login, refresh, activation, password reset
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: TokenService,
    mailer: Arc<dyn Mailer>,
    api_url: String,
}

impl AuthService {
    /// Create a new AuthService
    ///
    /// # Arguments
    /// * `users` - User record store
    /// * `tokens` - Token service backed by the session and action-token stores
    /// * `mailer` - Outbound mail for activation and reset links
    /// * `api_url` - Base URL the links point at
    pub fn new(
        users: Arc<dyn UserStore>,
        tokens: TokenService,
        mailer: Arc<dyn Mailer>,
        api_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            tokens,
            mailer,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    /// Register a new customer, mail the activation link and open a session.
    /// The account starts out inactive but the session is usable immediately.
    pub async fn register(&self, registration: Registration) -> Result<AuthSession> {
        let user = self.signup_with_role(&registration, Role::Customer).await?;

        let token = self.tokens.issue_action_token(&user, ActionKind::Activate).await?;
        let link = format!("{}/activate/{}", self.api_url, token);
        self.dispatch(MailMessage::with_link(&user.email, MailTemplate::Activate, link))
            .await;

        let tokens = self.tokens.start_session(&user).await?;
        tracing::info!(user_id = %user.id, "user registered");

        Ok(AuthSession { tokens, user })
    }

    /// Create a user with the given role without mail or session side effects
    pub async fn signup_with_role(&self, registration: &Registration, role: Role) -> Result<User> {
        validate_registration(registration)?;

        if self.users.find_by_email(&registration.email).await?.is_some() {
            return Err(AuthError::AlreadyExists(registration.email.clone()));
        }

        let password_hash = hash_password_blocking(registration.password.clone()).await?;
        let user = User::new_with_role(registration, password_hash, role);

        // The existence check above races with concurrent signups; the store has
        // the final word on uniqueness.
        self.users.create(user).await.map_err(|e| match e {
            StoreError::Conflict(_) => AuthError::AlreadyExists(registration.email.clone()),
            other => AuthError::Store(other),
        })
    }

    /// Login a user and open a session, replacing any previous one
    pub async fn login(&self, credentials: Credentials) -> Result<AuthSession> {
        let user = self
            .users
            .find_by_email(&credentials.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password_blocking(credentials.password, user.password_hash.clone()).await? {
            tracing::debug!(user_id = %user.id, "login rejected");
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.tokens.start_session(&user).await?;
        tracing::info!(user_id = %user.id, "user logged in");

        Ok(AuthSession { tokens, user })
    }

    /// End the session of this refresh token. Unknown tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let removed = self.tokens.end_session(refresh_token).await?;
        tracing::debug!(removed, "logout");
        Ok(())
    }

    /// Exchange a refresh token for a new pair. The presented token must verify
    /// and still be the user's current session.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<AuthSession> {
        let refresh_token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Unauthorized)?;

        let claims = self
            .tokens
            .verify_refresh(refresh_token)
            .ok_or(AuthError::Unauthorized)?;

        if self.tokens.find_session(refresh_token).await?.is_none() {
            tracing::debug!(user_id = %claims.id, "refresh token superseded or logged out");
            return Err(AuthError::Unauthorized);
        }

        let user = self
            .users
            .find_by_id(claims.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let tokens = self.tokens.start_session(&user).await?;
        Ok(AuthSession { tokens, user })
    }

    /// Mark the account active. The link works once.
    pub async fn activate(&self, action_token: &str) -> Result<User> {
        let claims = self
            .tokens
            .redeem_action_token(action_token, ActionKind::Activate)
            .await?;

        let mut user = self.find_user(claims.id).await?;
        user.status = Status::Active;
        user.touch();
        let user = self.save(user).await?;

        self.tokens
            .clear_action_tokens(user.id, ActionKind::Activate)
            .await?;
        tracing::info!(user_id = %user.id, "account activated");

        Ok(user)
    }

    /// Mail a password-reset link
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User with {email}")))?;

        let token = self.tokens.issue_action_token(&user, ActionKind::Forgot).await?;
        let link = format!("{}/forgot/password/{}", self.api_url, token);
        self.dispatch(MailMessage::with_link(&user.email, MailTemplate::Forgot, link))
            .await;

        tracing::info!(user_id = %user.id, "password reset requested");
        Ok(())
    }

    /// Replace the password using a reset link. The link works once; it is
    /// consumed before hashing, so a failed save needs a fresh link.
    pub async fn set_new_password(&self, action_token: &str, password: &str) -> Result<()> {
        validate_password(password)?;

        let claims = self
            .tokens
            .redeem_action_token(action_token, ActionKind::Forgot)
            .await?;

        let mut user = self.find_user(claims.id).await?;
        user.password_hash = hash_password_blocking(password.to_string()).await?;
        user.touch();
        let user = self.save(user).await?;

        self.tokens
            .clear_action_tokens(user.id, ActionKind::Forgot)
            .await?;
        tracing::info!(user_id = %user.id, "password changed");

        Ok(())
    }

    pub async fn find_user(&self, id: UserId) -> Result<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User with ID {id}")))
    }

    /// Takes effect for claims issued after the change; live access tokens keep
    /// their old role until they expire.
    pub async fn assign_role(&self, id: UserId, role: Role) -> Result<User> {
        let mut user = self.find_user(id).await?;
        user.role = role;
        user.touch();
        let user = self.save(user).await?;
        tracing::info!(user_id = %user.id, %role, "role assigned");
        Ok(user)
    }

    pub async fn assign_account(&self, id: UserId, account: Account) -> Result<User> {
        let mut user = self.find_user(id).await?;
        user.account = account;
        user.touch();
        let user = self.save(user).await?;
        tracing::info!(user_id = %user.id, %account, "account assigned");
        Ok(user)
    }

    /// Force a status, bypassing the activation link (seeding and administration)
    pub async fn set_status(&self, id: UserId, status: Status) -> Result<User> {
        let mut user = self.find_user(id).await?;
        user.status = status;
        user.touch();
        self.save(user).await
    }

    async fn save(&self, user: User) -> Result<User> {
        let id = user.id;
        self.users
            .update(user)
            .await?
            .ok_or_else(|| AuthError::NotFound(format!("User with ID {id}")))
    }

    async fn dispatch(&self, message: MailMessage) {
        let to = message.to.clone();
        let template = message.template;
        if let Err(e) = self.mailer.send(message).await {
            tracing::warn!(%to, ?template, error = %e, "mail dispatch failed");
        }
    }
}
