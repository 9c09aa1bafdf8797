use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration load failed: {0}")]
    Load(#[from] config::ConfigError),

    #[error("auth.jwt_secret is required and must not be empty")]
    MissingJwtSecret,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub auth: AuthConfig,
    #[serde(default)]
    pub mail: MailConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Secret used to sign session tokens. Required; issuance fails closed
    /// when this is unset or empty, there is no built-in fallback value.
    pub jwt_secret: String,
    #[serde(default = "default_session_ttl")]
    pub session_ttl_seconds: i64,
    #[serde(default = "default_reset_token_ttl")]
    pub reset_token_ttl_seconds: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MailConfig {
    /// Base URL the reset/verification links point at.
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,
    #[serde(default = "default_sender")]
    pub sender: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            frontend_url: default_frontend_url(),
            sender: default_sender(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_session_ttl() -> i64 {
    3600 // 1 hour
}

fn default_reset_token_ttl() -> i64 {
    3600 // 1 hour
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_sender() -> String {
    "no-reply@flockkit.local".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()
    }

    /// Load configuration from flockkit.toml (optional) with environment
    /// variable overrides. Environment variables are prefixed with FLOCKKIT
    /// and use `__` between path segments, e.g. FLOCKKIT__AUTH__JWT_SECRET,
    /// FLOCKKIT__SERVER__PORT.
    pub fn load() -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("flockkit").required(false))
            .add_source(config::Environment::with_prefix("FLOCKKIT").separator("__"))
            .build()?;

        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()
    }

    /// Reject configurations that would make token signing guessable.
    fn validate(self) -> Result<Self, ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        Ok(self)
    }
}
