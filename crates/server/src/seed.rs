use adkit_core::SeedConfig;
use auth::{AuthService, Registration, Role, Status, UserStore};

/// Create the configured administrator unless the email is already taken
pub async fn seed_admin(auth_service: &AuthService, seed: &SeedConfig) -> auth::Result<()> {
    let (Some(email), Some(password)) = (&seed.admin_email, &seed.admin_password) else {
        tracing::debug!("no administrator configured, skipping seed");
        return Ok(());
    };

    if let Some(existing) = auth_service.users().find_by_email(email).await? {
        if existing.has_role(Role::Admin) {
            tracing::info!(%email, active = existing.is_active(), "administrator already exists");
        } else {
            tracing::warn!(%email, role = %existing.role, "seed email belongs to a non-admin user, skipping");
        }
        return Ok(());
    }

    let registration = Registration {
        name: seed.admin_name.clone(),
        email: email.clone(),
        phone: seed.admin_phone.clone(),
        password: password.clone(),
        avatar: None,
    };

    let user = auth_service.signup_with_role(&registration, Role::Admin).await?;
    auth_service.set_status(user.id, Status::Active).await?;
    tracing::info!(user_id = %user.id, %email, "administrator created");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use auth::{
        Credentials, MemoryActionTokenStore, MemoryMailer, MemorySessionStore, MemoryUserStore,
        TokenService, TokenSettings,
    };
    use std::sync::Arc;

    fn service() -> AuthService {
        let tokens = TokenService::new(
            TokenSettings::with_default_ttls("access", "refresh", "activate", "forgot"),
            Arc::new(MemorySessionStore::new()),
            Arc::new(MemoryActionTokenStore::new()),
        );
        AuthService::new(
            Arc::new(MemoryUserStore::new()),
            tokens,
            Arc::new(MemoryMailer::new()),
            "http://localhost:3000",
        )
    }

    fn seed_config() -> SeedConfig {
        SeedConfig {
            admin_email: Some("root@adkit.local".to_string()),
            admin_password: Some("Admin1234".to_string()),
            admin_name: "Administrator".to_string(),
            admin_phone: "0000000000".to_string(),
        }
    }

    #[tokio::test]
    async fn test_seed_creates_active_admin_once() {
        let service = service();

        seed_admin(&service, &seed_config()).await.unwrap();
        seed_admin(&service, &seed_config()).await.unwrap();

        let session = service
            .login(Credentials {
                email: "root@adkit.local".to_string(),
                password: "Admin1234".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.user.role, Role::Admin);
        assert_eq!(session.user.status, Status::Active);
    }

    #[tokio::test]
    async fn test_seed_skipped_without_credentials() {
        let service = service();
        seed_admin(&service, &SeedConfig::default()).await.unwrap();

        assert!(service.users().find_by_email("root@adkit.local").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_seed_leaves_existing_non_admin_alone() {
        let service = service();
        let registration = Registration {
            name: "John".to_string(),
            email: "root@adkit.local".to_string(),
            phone: "0501234567".to_string(),
            password: "Qwerty123".to_string(),
            avatar: None,
        };
        service.signup_with_role(&registration, Role::Customer).await.unwrap();

        seed_admin(&service, &seed_config()).await.unwrap();

        let user = service.users().find_by_email("root@adkit.local").await.unwrap().unwrap();
        assert!(user.has_role(Role::Customer));
        assert!(!user.is_active());
    }
}
