//! Configuration loading for thoughtboard.
//!
//! Sources, highest precedence first:
//! 1. Command-line flags (applied by the caller via [`Config::apply_overrides`])
//! 2. Environment variables prefixed with `THOUGHTBOARD_` (nested keys split
//!    on `__`), plus the bare `SECRET_KEY`
//! 3. TOML file (`thoughtboard.toml` or `--config <path>`)
//! 4. Default values

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::channel::DEFAULT_SESSION_CAPACITY;
use crate::error::{BoardError, Result};
use crate::storage::DEFAULT_DB;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "thoughtboard.toml";

const ENV_PREFIX: &str = "THOUGHTBOARD_";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Secret for session and transport signing.
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Events buffered per push session before deliveries are dropped.
    pub session_queue_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            session_queue_capacity: DEFAULT_SESSION_CAPACITY,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DB),
        }
    }
}

/// Values given on the command line; `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
}

impl Config {
    /// Load with an optional explicit config file.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self> {
        let config_file = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

        let config: Config = Self::figment(&config_file).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::raw().only(&["SECRET_KEY"]))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(host) = overrides.host {
            self.server.host = host;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(database) = overrides.database {
            self.storage.database_path = database;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(BoardError::Config("server.host must not be empty".to_string()));
        }
        if self.server.session_queue_capacity == 0 {
            return Err(BoardError::Config(
                "server.session_queue_capacity must be greater than 0".to_string(),
            ));
        }
        if self.storage.database_path.as_os_str().is_empty() {
            return Err(BoardError::Config(
                "storage.database_path must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The configured secret, treating an empty string as unset.
    pub fn secret(&self) -> Option<&str> {
        self.secret_key.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// Fail unless a secret is configured. In dev mode a missing secret is
    /// only warned about.
    pub fn require_secret(&self, dev: bool) -> Result<()> {
        if self.secret().is_some() {
            return Ok(());
        }
        if dev {
            tracing::warn!("no SECRET_KEY configured; running in dev mode without one");
            return Ok(());
        }
        Err(BoardError::Config(
            "SECRET_KEY is not set (set it, or pass --dev for local use)".to_string(),
        ))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl From<figment::Error> for BoardError {
    fn from(e: figment::Error) -> Self {
        BoardError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.session_queue_capacity, 64);
        assert_eq!(config.storage.database_path, PathBuf::from("thoughts.db"));
        assert!(config.secret_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("board.toml");
        std::fs::write(
            &path,
            "[server]\nport = 8080\nsession_queue_capacity = 8\n\n[storage]\ndatabase_path = \"/srv/boards.db\"\n",
        )
        .unwrap();

        let config = Config::load_from(Some(&path)).unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.session_queue_capacity, 8);
        assert_eq!(config.storage.database_path, PathBuf::from("/srv/boards.db"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load_from(Some(&tmp.path().join("absent.toml"))).unwrap();
        assert_eq!(config.server.session_queue_capacity, 64);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "[server]\nsession_queue_capacity = 0\n").unwrap();

        let err = Config::load_from(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("session_queue_capacity"));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Overrides {
            host: Some("127.0.0.1".to_string()),
            port: Some(9000),
            database: None,
        });

        assert_eq!(config.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.storage.database_path, PathBuf::from("thoughts.db"));
    }

    #[test]
    fn test_secret_required_outside_dev() {
        let mut config = Config::default();
        assert!(config.require_secret(false).is_err());
        assert!(config.require_secret(true).is_ok());

        config.secret_key = Some("   ".to_string());
        assert!(config.secret().is_none());
        assert!(config.require_secret(false).is_err());

        config.secret_key = Some("s3cret".to_string());
        assert_eq!(config.secret(), Some("s3cret"));
        assert!(config.require_secret(false).is_ok());
    }

    #[test]
    fn test_validate_empty_host() {
        let mut config = Config::default();
        config.server.host = String::new();
        assert!(config.validate().unwrap_err().to_string().contains("host"));
    }
}
