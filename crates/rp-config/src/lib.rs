//! # rp-config
//!
//! Process-wide settings, loaded once at startup and shared by reference.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. `RP__SECTION__KEY` environment variables (a `.env` file is honored)
//! 3. the plain `PORT` and `DATABASE_URL` variables

use std::env;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

const DEV_SECRET: &str = "development-secret-change-in-production";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreSettings {
    /// Connection string, e.g. `sqlite:rusty_profile.db?mode=rwc`
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct AuthSettings {
    pub jwt_secret: SecretString,
    pub token_ttl_hours: i64,
    /// Marks the token cookie `Secure`. Enable behind TLS.
    pub secure_cookies: bool,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env(env::var("PORT").ok(), env::var("DATABASE_URL").ok())
    }

    fn from_env(port: Option<String>, database_url: Option<String>) -> Result<Self, ConfigError> {
        let settings: Settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("store.url", "sqlite:rusty_profile.db?mode=rwc")?
            .set_default("store.max_connections", 5)?
            .set_default("auth.jwt_secret", DEV_SECRET)?
            .set_default("auth.token_ttl_hours", 24)?
            .set_default("auth.secure_cookies", false)?
            .add_source(
                config::Environment::with_prefix("RP")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", port)?
            .set_override_option("store.url", database_url)?
            .build()?
            .try_deserialize()?;

        if settings.auth.jwt_secret.expose_secret() == DEV_SECRET {
            tracing::warn!("using the development JWT secret; set RP__AUTH__JWT_SECRET");
        }
        Ok(settings)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_env(None, None).unwrap();
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.auth.token_ttl_hours, 24);
        assert!(!settings.auth.secure_cookies);
        assert!(settings.store.url.starts_with("sqlite:"));
    }

    #[test]
    fn test_plain_overrides_win() {
        let settings = Settings::from_env(
            Some("8081".to_string()),
            Some("sqlite::memory:".to_string()),
        )
        .unwrap();
        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.store.url, "sqlite::memory:");
        assert_eq!(settings.listen_addr(), "0.0.0.0:8081");
    }

    #[test]
    fn test_bad_port_is_an_error() {
        assert!(Settings::from_env(Some("not-a-port".to_string()), None).is_err());
    }
}
