use config::{Config, ConfigError, Environment, File, FileFormat, FileSourceFile, Map};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub auth: AuthConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Signing secrets and lifetimes for the four credential classes.
#[derive(Deserialize, Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub activate_secret: String,
    pub forgot_secret: String,
    #[serde(default = "default_access_ttl")]
    pub access_ttl_seconds: i64,
    #[serde(default = "default_long_ttl")]
    pub refresh_ttl_seconds: i64,
    #[serde(default = "default_long_ttl")]
    pub activate_ttl_seconds: i64,
    #[serde(default = "default_long_ttl")]
    pub forgot_ttl_seconds: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secrets", &"[REDACTED]")
            .field("access_ttl_seconds", &self.access_ttl_seconds)
            .field("refresh_ttl_seconds", &self.refresh_ttl_seconds)
            .field("activate_ttl_seconds", &self.activate_ttl_seconds)
            .field("forgot_ttl_seconds", &self.forgot_ttl_seconds)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Base URL embedded in activation and password-reset links.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub json_logs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api_url: default_api_url(),
            json_logs: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    #[serde(default = "default_mail_from")]
    pub from: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self { from: default_mail_from() }
    }
}

/// Optional administrator account created at start-up.
#[derive(Deserialize, Clone, Default)]
pub struct SeedConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    #[serde(default = "default_admin_phone")]
    pub admin_phone: String,
}

impl std::fmt::Debug for SeedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedConfig")
            .field("admin_email", &self.admin_email)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "[REDACTED]"))
            .field("admin_name", &self.admin_name)
            .field("admin_phone", &self.admin_phone)
            .finish()
    }
}

fn default_access_ttl() -> i64 {
    30 * 60
}

fn default_long_ttl() -> i64 {
    7 * 24 * 60 * 60
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_mail_from() -> String {
    "noreply@adkit.local".to_string()
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

fn default_admin_phone() -> String {
    "0000000000".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Load configuration from adkit.toml in the current directory
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_file("adkit.toml")
    }

    /// Load configuration with environment variable overrides
    /// Environment variables are prefixed with ADKIT_ and nested with `__`
    /// Example: ADKIT_AUTH__ACCESS_SECRET, ADKIT_SERVER__PORT
    ///
    /// Returns the config and the keys that were overridden by the environment
    pub fn load_with_env() -> Result<(Self, Vec<String>), ConfigError> {
        Self::layered(File::with_name("adkit").required(false), std::env::vars().collect())
    }

    /// `file` overlaid by the `ADKIT_` entries of `env`
    fn layered(
        file: File<FileSourceFile, FileFormat>,
        env: Map<String, String>,
    ) -> Result<(Self, Vec<String>), ConfigError> {
        let env_vars = [
            ("ADKIT_AUTH__ACCESS_SECRET", "auth.access_secret"),
            ("ADKIT_AUTH__REFRESH_SECRET", "auth.refresh_secret"),
            ("ADKIT_AUTH__ACTIVATE_SECRET", "auth.activate_secret"),
            ("ADKIT_AUTH__FORGOT_SECRET", "auth.forgot_secret"),
            ("ADKIT_AUTH__ACCESS_TTL_SECONDS", "auth.access_ttl_seconds"),
            ("ADKIT_AUTH__REFRESH_TTL_SECONDS", "auth.refresh_ttl_seconds"),
            ("ADKIT_AUTH__ACTIVATE_TTL_SECONDS", "auth.activate_ttl_seconds"),
            ("ADKIT_AUTH__FORGOT_TTL_SECONDS", "auth.forgot_ttl_seconds"),
            ("ADKIT_SERVER__HOST", "server.host"),
            ("ADKIT_SERVER__PORT", "server.port"),
            ("ADKIT_SERVER__API_URL", "server.api_url"),
            ("ADKIT_SERVER__JSON_LOGS", "server.json_logs"),
            ("ADKIT_MAIL__FROM", "mail.from"),
            ("ADKIT_SEED__ADMIN_EMAIL", "seed.admin_email"),
            ("ADKIT_SEED__ADMIN_PASSWORD", "seed.admin_password"),
        ];

        let overrides = env_vars
            .iter()
            .filter(|(env_var, _)| env.contains_key(*env_var))
            .map(|(_, key)| key.to_string())
            .collect();

        // The prefix is joined with a single `_`, nesting uses `__`.
        let config = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("ADKIT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env)),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok((app_config, overrides))
    }

    /// Secrets must be present and distinct per credential class, otherwise a
    /// credential minted for one purpose would verify for another.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secrets = [
            ("auth.access_secret", &self.auth.access_secret),
            ("auth.refresh_secret", &self.auth.refresh_secret),
            ("auth.activate_secret", &self.auth.activate_secret),
            ("auth.forgot_secret", &self.auth.forgot_secret),
        ];

        for (key, secret) in &secrets {
            if secret.trim().is_empty() {
                return Err(ConfigError::Message(format!("{key} must not be empty")));
            }
        }

        for (i, (key, secret)) in secrets.iter().enumerate() {
            if let Some((other, _)) = secrets[i + 1..].iter().find(|(_, s)| s == secret) {
                return Err(ConfigError::Message(format!(
                    "{key} and {other} must use different secrets"
                )));
            }
        }

        let ttls = [
            ("auth.access_ttl_seconds", self.auth.access_ttl_seconds),
            ("auth.refresh_ttl_seconds", self.auth.refresh_ttl_seconds),
            ("auth.activate_ttl_seconds", self.auth.activate_ttl_seconds),
            ("auth.forgot_ttl_seconds", self.auth.forgot_ttl_seconds),
        ];
        if let Some((key, _)) = ttls.iter().find(|(_, ttl)| *ttl <= 0) {
            return Err(ConfigError::Message(format!("{key} must be positive")));
        }

        Ok(())
    }
}
