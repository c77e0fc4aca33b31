use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AuthError;

pub type UserId = Uuid;

/// User roles for authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Seller,
    Manager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Seller => "seller",
            Role::Manager => "manager",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Role::Customer),
            "seller" => Ok(Role::Seller),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            other => Err(AuthError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Account {
    #[default]
    Base,
    Premium,
}

impl Account {
    pub fn as_str(&self) -> &'static str {
        match self {
            Account::Base => "base",
            Account::Premium => "premium",
        }
    }
}

impl FromStr for Account {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "base" => Ok(Account::Base),
            "premium" => Ok(Account::Premium),
            other => Err(AuthError::Validation(format!("unknown account '{other}'"))),
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Inactive,
    Active,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Inactive => "inactive",
            Status::Active => "active",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purpose of a single-use action token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Activate,
    Forgot,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Activate => "activate",
            ActionKind::Forgot => "forgot",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// User model for authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub account: Account,
    pub status: Status,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new inactive user with the given role and an already hashed password
    pub fn new_with_role(registration: &Registration, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: registration.name.clone(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
            password_hash,
            avatar: registration.avatar.clone(),
            role,
            account: Account::default(),
            status: Status::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn view(&self) -> UserView {
        UserView::from(self)
    }
}

/// Public projection of a user; never carries the password digest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub avatar: Option<String>,
    pub role: Role,
    pub account: Account,
    pub status: Status,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            avatar: user.avatar.clone(),
            role: user.role,
            account: user.account,
            status: user.status,
        }
    }
}

/// Session record holding the one live refresh token of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub refresh_token: String,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId, refresh_token: String) -> Self {
        Self {
            user_id,
            refresh_token,
            updated_at: Utc::now(),
        }
    }
}

/// Pending action token record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionToken {
    pub id: Uuid,
    pub user_id: UserId,
    pub kind: ActionKind,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

impl ActionToken {
    pub fn new(user_id: UserId, kind: ActionKind, token: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind,
            token,
            created_at: Utc::now(),
        }
    }
}
