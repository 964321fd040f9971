//! Application Configuration
//!
//! Environment-driven configuration for the server and the document store
//! connection. The connection string is the only required value; everything
//! else has a default suitable for local development.

use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The MongoDB connection string is not configured
    #[error("MONGODB_URI is not set")]
    MissingConnectionString,

    /// A numeric environment value could not be parsed
    #[error("invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// MongoDB connection string (required, from MONGODB_URI)
    pub mongodb_uri: String,

    /// Database name (default: "rollcall")
    #[serde(default = "default_database")]
    pub database: String,

    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 5000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment name reported by the health endpoints
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Directory holding the static front-end build
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_database() -> String {
    "rollcall".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mongodb_uri = env::var("MONGODB_URI")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingConnectionString)?;

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue("PORT", raw))?,
            Err(_) => default_port(),
        };

        Ok(Self {
            mongodb_uri,
            database: env::var("MONGODB_DB").unwrap_or_else(|_| default_database()),
            host: env::var("HOST").unwrap_or_else(|_| default_host()),
            port,
            environment: env::var("APP_ENV").unwrap_or_else(|_| default_environment()),
            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_static_dir()),
        })
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            mongodb_uri: "mongodb://localhost:27017".to_string(),
            database: default_database(),
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            static_dir: default_static_dir(),
        }
    }

    #[test]
    fn test_defaults() {
        let config = base_config();
        assert_eq!(config.database, "rollcall");
        assert_eq!(config.port, 5000);
        assert_eq!(config.environment, "development");
        assert_eq!(config.static_dir, PathBuf::from("public"));
    }

    #[test]
    fn test_socket_addr() {
        let mut config = base_config();
        config.port = 8080;
        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
    }
}
