//! Configuration management for the automation agent.
//!
//! Configuration can be set via environment variables:
//! - `AIPROXY_TOKEN` - Required. Bearer token for the completion provider.
//! - `USER_EMAIL` - Optional. Operator identity used by the sample-data
//!   generation routine. Defaults to `user@example.com`.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `8000`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Process-wide configuration, read once at startup and immutable thereafter.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bearer token for the completion provider
    pub aiproxy_token: String,

    /// Operator email fed to the data-generation routine
    pub user_email: String,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `AIPROXY_TOKEN` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let aiproxy_token = std::env::var("AIPROXY_TOKEN")
            .map_err(|_| ConfigError::MissingEnvVar("AIPROXY_TOKEN".to_string()))?;

        let user_email =
            std::env::var("USER_EMAIL").unwrap_or_else(|_| "user@example.com".to_string());

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        Ok(Self {
            aiproxy_token,
            user_email,
            host,
            port,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(aiproxy_token: String, user_email: String) -> Self {
        Self {
            aiproxy_token,
            user_email,
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}
