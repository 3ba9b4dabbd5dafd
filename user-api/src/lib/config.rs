use std::env;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

pub const DEVELOPMENT: &str = "development";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub admin: Option<AdminConfig>,
    /// Name of the active environment, taken from `RUN_MODE`
    #[serde(default = "default_run_mode")]
    pub run_mode: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    /// Tokens carry no expiry unless this is set
    #[serde(default)]
    pub expiration_hours: Option<i64>,
}

/// Administrator provisioned at startup
#[derive(Debug, Deserialize, Clone)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

fn default_run_mode() -> String {
    DEVELOPMENT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    ///
    /// A missing or blank signing secret is a load error.
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| DEVELOPMENT.to_string());

        let configuration = ConfigBuilder::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on environment-specific configuration
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Layer on environment variables (with __ as separator)
            // Example: JWT__SECRET=... overrides jwt.secret
            .add_source(Environment::default().separator("__"))
            .set_override("run_mode", run_mode)?
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message(
                "jwt.secret must be set (JWT__SECRET)".to_string(),
            ));
        }
        if matches!(self.jwt.expiration_hours, Some(hours) if hours <= 0) {
            return Err(ConfigError::Message(
                "jwt.expiration_hours must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_development(&self) -> bool {
        self.run_mode == DEVELOPMENT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, expiration_hours: Option<i64>) -> Config {
        Config {
            server: ServerConfig {
                http_port: 3000,
                request_timeout_secs: 30,
            },
            jwt: JwtConfig {
                secret: secret.to_string(),
                expiration_hours,
            },
            database: None,
            admin: None,
            run_mode: DEVELOPMENT.to_string(),
        }
    }

    #[test]
    fn test_validate_accepts_secret() {
        assert!(config("a-signing-secret", None).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_secret() {
        assert!(config("   ", None).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_non_positive_expiration() {
        assert!(config("a-signing-secret", Some(0)).validate().is_err());
    }

    #[test]
    fn test_is_development() {
        let mut production = config("a-signing-secret", None);
        production.run_mode = "production".to_string();

        assert!(config("a-signing-secret", None).is_development());
        assert!(!production.is_development());
    }
}
