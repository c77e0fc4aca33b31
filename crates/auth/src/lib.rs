// Core modules
mod error;
mod jwt;
mod password;
mod validation;

pub mod guard;
pub mod mail;
pub mod memory;
pub mod model;
pub mod service;
pub mod store;
pub mod token;

// Re-export error types
pub use error::{AuthError, CodecError, ErrorKind, Result};

// Re-export crypto primitives
pub use jwt::{sign, verify, ActionClaims, Claims, SessionClaims};
pub use password::{hash_password, verify_password};
pub use validation::{validate_email, validate_password, validate_phone, validate_registration};

pub use guard::{Access, AccountPolicy, AuthorizationGuard, Denied, Requirement, RolePolicy};
pub use mail::{LogMailer, MailMessage, MailTemplate, Mailer, MemoryMailer};
pub use memory::{MemoryActionTokenStore, MemorySessionStore, MemoryUserStore};
pub use model::{
    Account, ActionKind, ActionToken, Credentials, Registration, Role, Session, Status, User, UserId,
    UserView,
};
pub use service::{AuthService, AuthSession};
pub use store::{ActionTokenStore, SessionStore, StoreError, UserStore};
pub use token::{CredentialClass, SigningKey, TokenPair, TokenService, TokenSettings};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Account, AuthError, AuthService, AuthSession, AuthorizationGuard, Requirement, Result, Role,
        SessionClaims, Status, TokenService, TokenSettings, User,
    };
}
