use std::sync::Arc;

use anyhow::Context;
use api::{router, AppState};
use auth::{
    AuthService, AuthorizationGuard, LogMailer, MemoryActionTokenStore, MemorySessionStore,
    MemoryUserStore, SigningKey, TokenService, TokenSettings,
};
use adkit_core::{telemetry, AppConfig, AuthConfig};

mod seed;

fn token_settings(config: &AuthConfig) -> TokenSettings {
    TokenSettings {
        access: SigningKey::new(config.access_secret.clone(), config.access_ttl_seconds),
        refresh: SigningKey::new(config.refresh_secret.clone(), config.refresh_ttl_seconds),
        activate: SigningKey::new(config.activate_secret.clone(), config.activate_ttl_seconds),
        forgot: SigningKey::new(config.forgot_secret.clone(), config.forgot_ttl_seconds),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, overrides) = AppConfig::load_with_env().context("failed to load configuration")?;
    telemetry::init(config.server.json_logs);

    if !overrides.is_empty() {
        tracing::info!(keys = ?overrides, "configuration overridden from environment");
    }

    let settings = token_settings(&config.auth);
    let guard = AuthorizationGuard::new(settings.access.clone());
    let tokens = TokenService::new(
        settings,
        Arc::new(MemorySessionStore::new()),
        Arc::new(MemoryActionTokenStore::new()),
    );
    let auth_service = AuthService::new(
        Arc::new(MemoryUserStore::new()),
        tokens,
        Arc::new(LogMailer::new(config.mail.from.clone())),
        config.server.api_url.clone(),
    );

    seed::seed_admin(&auth_service, &config.seed)
        .await
        .context("failed to seed administrator")?;

    let state = Arc::new(AppState::new(auth_service, guard));
    let app = router::router(state);

    let listener = tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", config.server.host, config.server.port))?;
    let addr = listener.local_addr()?;

    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_settings_follow_config() {
        let config = AuthConfig {
            access_secret: "a".into(),
            refresh_secret: "r".into(),
            activate_secret: "act".into(),
            forgot_secret: "f".into(),
            access_ttl_seconds: 60,
            refresh_ttl_seconds: 120,
            activate_ttl_seconds: 180,
            forgot_ttl_seconds: 240,
        };

        let settings = token_settings(&config);
        assert_eq!(settings.access.ttl_seconds(), 60);
        assert_eq!(settings.refresh.ttl_seconds(), 120);
        assert_eq!(settings.activate.ttl_seconds(), 180);
        assert_eq!(settings.forgot.ttl_seconds(), 240);
    }
}
