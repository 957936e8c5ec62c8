//! Configuration module for geev-server.
//!
//! Handles loading configuration from the TOML file, CLI arguments, and
//! environment variables.

pub mod file;

use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

pub use file::{FileConfig, LeaderboardConfig, ServerConfig};

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// An absent file yields the defaults; an unreadable or malformed file
    /// is an error.
    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        let mut config = if self.config_path.exists() {
            let raw = std::fs::read_to_string(&self.config_path)?;
            toml::from_str(&raw)?
        } else {
            tracing::warn!(
                path = %self.config_path.display(),
                "config file not found, using defaults"
            );
            FileConfig::default()
        };

        if let Some(listen) = self.listen_override {
            config.server.listen = listen;
        }

        Ok(config)
    }

    /// Re-read the configuration file (used during SIGHUP reload).
    pub fn reload(&self) -> Result<FileConfig, ConfigError> {
        self.load()
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}
