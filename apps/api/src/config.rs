//! API server configuration.
//!
//! Layered with the `config` crate, later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. `warung.toml` in the working directory (optional)
//! 3. `WARUNG_*` environment variables (`WARUNG_PORT`, `WARUNG_JWT_SECRET`, ...)

use chrono::FixedOffset;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use tracing::warn;
use warung_core::validation::parse_utc_offset;

/// Used outside production when no secret is configured.
const DEV_JWT_SECRET: &str = "warung-dev-secret-change-in-production";

/// API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Bind address
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// HS256 signing secret (required in production)
    pub jwt_secret: Option<String>,

    /// Token lifetime in hours
    pub token_ttl_hours: i64,

    /// `development` or `production`
    pub environment: String,

    /// Fixed offset report days are computed in, e.g. `+07:00`
    pub report_utc_offset: String,

    /// Admin created at startup when the users table is empty
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl AppConfig {
    /// Load configuration from defaults, `warung.toml` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::defaults()?
            .add_source(File::with_name("warung").required(false))
            .add_source(Environment::with_prefix("WARUNG").try_parsing(true))
            .build()?;

        Self::from_config(config)
    }

    /// Builder pre-populated with every default.
    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .set_default("database_path", "warung.db")?
            .set_default("db_max_connections", 5)?
            .set_default("token_ttl_hours", 24)?
            .set_default("environment", "development")?
            .set_default("report_utc_offset", "+07:00")?)
    }

    /// Deserialize and validate a built configuration.
    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Checks values the type system can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.is_production() && self.jwt_secret.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::MissingRequired("jwt_secret".to_string()));
        }

        if self.token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                key: "token_ttl_hours".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "db_max_connections".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }

        if self.admin_username.is_some() != self.admin_password.is_some() {
            return Err(ConfigError::InvalidValue {
                key: "admin_username".to_string(),
                reason: "admin_username and admin_password must be set together".to_string(),
            });
        }

        self.report_offset()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// The signing secret, falling back to a fixed development secret.
    pub fn jwt_secret(&self) -> String {
        match self.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
            Some(secret) => secret.to_string(),
            None => {
                warn!("WARUNG_JWT_SECRET not set, using the development secret");
                DEV_JWT_SECRET.to_string()
            }
        }
    }

    pub fn report_offset(&self) -> Result<FixedOffset, ConfigError> {
        parse_utc_offset(&self.report_utc_offset).map_err(|e| ConfigError::InvalidValue {
            key: "report_utc_offset".to_string(),
            reason: e.to_string(),
        })
    }

    pub fn token_ttl_secs(&self) -> i64 {
        self.token_ttl_hours * 3600
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(overrides: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let mut builder = AppConfig::defaults()?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        AppConfig::from_config(builder.build()?)
    }

    #[test]
    fn test_defaults() {
        let config = build(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_path, "warung.db");
        assert_eq!(config.token_ttl_secs(), 24 * 3600);
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(
            config.report_offset().unwrap(),
            FixedOffset::east_opt(7 * 3600).unwrap()
        );
        assert!(!config.is_production());
        assert_eq!(config.jwt_secret(), DEV_JWT_SECRET);
    }

    #[test]
    fn test_production_requires_secret() {
        let err = build(&[("environment", "production")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(key) if key == "jwt_secret"));

        let config = build(&[("environment", "production"), ("jwt_secret", "s3cret")]).unwrap();
        assert_eq!(config.jwt_secret(), "s3cret");
    }

    #[test]
    fn test_bad_offset_rejected() {
        let err = build(&[("report_utc_offset", "WIB")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "report_utc_offset"));
    }

    #[test]
    fn test_admin_credentials_come_in_pairs() {
        assert!(build(&[("admin_username", "owner")]).is_err());
        let config = build(&[("admin_username", "owner"), ("admin_password", "pw")]).unwrap();
        assert_eq!(config.admin_username.as_deref(), Some("owner"));
    }
}
