//! Bearer-token authorization for individual operations.
//!
//! An operation attaches a [`Requirement`]: a set of roles and a set of account
//! tiers. Each non-empty set is checked on its own against the verified access
//! claims and both must admit the request. Every failure collapses into the
//! same [`Denied`] outcome for the caller; the reason is only logged.

use std::collections::HashSet;
use std::hash::Hash;

use crate::error::CodecError;
use crate::jwt::SessionClaims;
use crate::model::{Account, Role};
use crate::token::SigningKey;

/// A per-operation policy over one claim of the access token
pub trait Policy {
    type Claim: Copy + Eq + Hash + std::fmt::Debug;

    /// Claim values admitted by the operation; empty means public
    fn required(&self) -> &HashSet<Self::Claim>;

    fn claim(claims: &SessionClaims) -> Option<Self::Claim>;

    fn admits(&self, claims: &SessionClaims) -> bool {
        Self::claim(claims).is_some_and(|value| self.required().contains(&value))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePolicy(HashSet<Role>);

impl RolePolicy {
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self(roles.into_iter().collect())
    }
}

impl Policy for RolePolicy {
    type Claim = Role;

    fn required(&self) -> &HashSet<Role> {
        &self.0
    }

    fn claim(claims: &SessionClaims) -> Option<Role> {
        Some(claims.role)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPolicy(HashSet<Account>);

impl AccountPolicy {
    pub fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        Self(accounts.into_iter().collect())
    }
}

impl Policy for AccountPolicy {
    type Claim = Account;

    fn required(&self) -> &HashSet<Account> {
        &self.0
    }

    fn claim(claims: &SessionClaims) -> Option<Account> {
        Some(claims.account)
    }
}

/// Everything an operation demands of its caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requirement {
    pub roles: RolePolicy,
    pub accounts: AccountPolicy,
}

impl Requirement {
    /// No requirement at all
    pub fn public() -> Self {
        Self::default()
    }

    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: RolePolicy::new(roles),
            ..Self::default()
        }
    }

    /// Any authenticated caller
    pub fn authenticated() -> Self {
        Self::roles([Role::Customer, Role::Seller, Role::Manager, Role::Admin])
    }

    pub fn with_accounts(mut self, accounts: impl IntoIterator<Item = Account>) -> Self {
        self.accounts = AccountPolicy::new(accounts);
        self
    }

    pub fn is_public(&self) -> bool {
        self.roles.required().is_empty() && self.accounts.required().is_empty()
    }
}

/// Internal reason for a denial, never shown to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    MissingCredential,
    MalformedHeader,
    InvalidCredential(CodecError),
    ClaimNotAdmitted,
}

/// Uniform rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Denied;

impl std::fmt::Display for Denied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("User is not authorized or unavailable")
    }
}

impl std::error::Error for Denied {}

/// Outcome of a successful check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// The operation declared no requirement; no credential was inspected
    Public,
    Granted(SessionClaims),
}

impl Access {
    pub fn claims(&self) -> Option<&SessionClaims> {
        match self {
            Access::Public => None,
            Access::Granted(claims) => Some(claims),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizationGuard {
    access: SigningKey,
}

impl AuthorizationGuard {
    /// `access` must be the access-token key; no other class is accepted
    pub fn new(access: SigningKey) -> Self {
        Self { access }
    }

    /// Decide on a request given its raw `Authorization` header value
    pub fn authorize(&self, requirement: &Requirement, authorization: Option<&str>) -> Result<Access, Denied> {
        self.decide(requirement, authorization).map_err(|reason| {
            tracing::debug!(?reason, "request denied");
            Denied
        })
    }

    fn decide(&self, requirement: &Requirement, authorization: Option<&str>) -> Result<Access, DenyReason> {
        let roles = self.evaluate(&requirement.roles, authorization)?;
        let accounts = self.evaluate(&requirement.accounts, authorization)?;

        Ok(match roles.or(accounts) {
            Some(claims) => Access::Granted(claims),
            None => Access::Public,
        })
    }

    /// One policy in isolation. `Ok(None)` when the policy is empty.
    fn evaluate<P: Policy>(&self, policy: &P, authorization: Option<&str>) -> Result<Option<SessionClaims>, DenyReason> {
        if policy.required().is_empty() {
            return Ok(None);
        }

        let header = authorization.ok_or(DenyReason::MissingCredential)?;
        let token = bearer_token(header).ok_or(DenyReason::MalformedHeader)?;

        let claims: SessionClaims = self
            .access
            .verify(token)
            .map_err(DenyReason::InvalidCredential)?;

        if !policy.admits(&claims) {
            return Err(DenyReason::ClaimNotAdmitted);
        }

        Ok(Some(claims))
    }
}

/// Token of a `Bearer <token>` header value. Exactly one space separates the
/// scheme from the token; any other whitespace makes the header malformed.
pub fn bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?;
    if token.is_empty() || token.contains(char::is_whitespace) {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use uuid::Uuid;

    fn access_key() -> SigningKey {
        SigningKey::new("access-secret", 1800)
    }

    fn guard() -> AuthorizationGuard {
        AuthorizationGuard::new(access_key())
    }

    fn header_for(role: Role, account: Account) -> String {
        let claims = SessionClaims {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            role,
            account,
            status: Status::Active,
        };
        format!("Bearer {}", access_key().sign(&claims).unwrap())
    }

    #[test]
    fn test_public_operation_allows_anything() {
        let guard = guard();
        let requirement = Requirement::public();

        assert_eq!(guard.authorize(&requirement, None), Ok(Access::Public));
        assert_eq!(guard.authorize(&requirement, Some("garbage")), Ok(Access::Public));
    }

    #[test]
    fn test_role_requirement() {
        let guard = guard();
        let requirement = Requirement::roles([Role::Manager, Role::Admin]);

        let seller = header_for(Role::Seller, Account::Base);
        let admin = header_for(Role::Admin, Account::Base);

        assert_eq!(guard.authorize(&requirement, Some(&seller)), Err(Denied));
        let access = guard.authorize(&requirement, Some(&admin)).unwrap();
        assert_eq!(access.claims().unwrap().role, Role::Admin);
        assert_eq!(guard.authorize(&requirement, None), Err(Denied));
    }

    #[test]
    fn test_malformed_header_is_denied() {
        let guard = guard();
        let requirement = Requirement::authenticated();
        let admin = header_for(Role::Admin, Account::Base);
        let raw_token = admin.trim_start_matches("Bearer ");

        assert_eq!(guard.authorize(&requirement, Some(raw_token)), Err(Denied));
        assert_eq!(guard.authorize(&requirement, Some("Bearer ")), Err(Denied));
        assert_eq!(guard.authorize(&requirement, Some(&format!("Bearer  {raw_token}"))), Err(Denied));
        assert_eq!(guard.authorize(&requirement, Some(&format!("{admin} "))), Err(Denied));
        assert_eq!(guard.authorize(&requirement, Some(&format!("Basic {raw_token}"))), Err(Denied));
    }

    #[test]
    fn test_token_under_other_secret_is_denied() {
        let guard = guard();
        let claims = SessionClaims {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            role: Role::Admin,
            account: Account::Premium,
            status: Status::Active,
        };
        let refresh = SigningKey::new("refresh-secret", 604_800).sign(&claims).unwrap();

        let result = guard.authorize(&Requirement::roles([Role::Admin]), Some(&format!("Bearer {refresh}")));
        assert_eq!(result, Err(Denied));
    }

    #[test]
    fn test_expired_token_is_denied() {
        let guard = guard();
        let claims = SessionClaims {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            role: Role::Admin,
            account: Account::Base,
            status: Status::Active,
        };
        let expired = SigningKey::new("access-secret", -1).sign(&claims).unwrap();

        let result = guard.authorize(&Requirement::roles([Role::Admin]), Some(&format!("Bearer {expired}")));
        assert_eq!(result, Err(Denied));
    }

    #[test]
    fn test_role_and_account_must_both_admit() {
        let guard = guard();
        let requirement = Requirement::roles([Role::Seller]).with_accounts([Account::Premium]);

        let premium_seller = header_for(Role::Seller, Account::Premium);
        let base_seller = header_for(Role::Seller, Account::Base);
        let premium_customer = header_for(Role::Customer, Account::Premium);

        assert!(guard.authorize(&requirement, Some(&premium_seller)).is_ok());
        assert_eq!(guard.authorize(&requirement, Some(&base_seller)), Err(Denied));
        assert_eq!(guard.authorize(&requirement, Some(&premium_customer)), Err(Denied));
    }

    #[test]
    fn test_account_only_requirement() {
        let guard = guard();
        let requirement = Requirement::public().with_accounts([Account::Premium]);

        let premium = header_for(Role::Customer, Account::Premium);
        let base = header_for(Role::Admin, Account::Base);

        assert!(matches!(guard.authorize(&requirement, Some(&premium)), Ok(Access::Granted(_))));
        assert_eq!(guard.authorize(&requirement, Some(&base)), Err(Denied));
        assert_eq!(guard.authorize(&requirement, None), Err(Denied));
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("Bearer  abc"), None);
        assert_eq!(bearer_token("Bearer abc "), None);
        assert_eq!(bearer_token("Bearer abc def"), None);
        assert_eq!(bearer_token("bearer abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
