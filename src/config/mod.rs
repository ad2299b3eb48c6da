pub mod env;
pub mod validation;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};
use env::{EnvParser, EnvVars};
use validation::ConfigValidator;

fn default_host() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_query_timeout_seconds() -> u64 {
    10
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database file path
    pub database_path: PathBuf,

    /// Address the HTTP server listens on
    #[serde(default = "default_host")]
    pub host: String,

    /// Deadline applied to every storage operation (seconds)
    #[serde(default = "default_query_timeout_seconds")]
    pub query_timeout_seconds: u64,

    /// Largest accepted request body (bytes)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        // Use /data only when explicitly running under Docker (DOCKER env var)
        let default_data_path = if EnvParser::is_present(EnvVars::DOCKER) {
            PathBuf::from("/data")
        } else {
            match ProjectDirs::from("dev", "songcat", "songcat") {
                Some(project_dirs) => project_dirs.data_dir().to_path_buf(),
                None => {
                    warn!("ProjectDirs unavailable; falling back to current directory for data path");
                    PathBuf::from(".")
                }
            }
        };

        Self {
            database_path: default_data_path.join("songs.db"),
            host: default_host(),
            query_timeout_seconds: default_query_timeout_seconds(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // .env is optional; it mirrors the HOST / SONGCAT_* variables
        dotenvy::dotenv().ok();

        let config_file = match config_path {
            Some(path) => PathBuf::from(path),
            None => Self::default_config_path()?,
        };

        let mut config = if config_file.exists() {
            Self::from_file(&config_file)?
        } else {
            Self::default()
        };

        // Environment variables have the highest priority
        config.load_from_env()?;
        config.validate()?;

        if let Some(parent) = config.database_path.parent() {
            create_dir(parent)?;
        }

        if !config_file.exists() {
            if let Some(parent) = config_file.parent() {
                create_dir(parent)?;
            }
            config.save(&config_file)?;
            debug!("Wrote default configuration to {}", config_file.display());
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let config: Config = toml::from_str(&content).map_err(ConfigError::from)?;
        Ok(config)
    }

    fn load_from_env(&mut self) -> Result<()> {
        if let Some(db_path) = EnvParser::parse_path(EnvVars::DATABASE_PATH, false)? {
            self.database_path = db_path;
        }

        let host = match EnvParser::parse_string(EnvVars::HOST, None)? {
            Some(host) => Some(host),
            None => EnvParser::parse_string(EnvVars::LEGACY_HOST, None)?,
        };
        if let Some(host) = host {
            self.host = host;
        }

        if let Some(timeout) = EnvParser::parse_u64(EnvVars::QUERY_TIMEOUT_SECONDS, 1, 300)? {
            self.query_timeout_seconds = timeout;
        }

        if let Some(limit) = EnvParser::parse_usize(EnvVars::MAX_BODY_BYTES, 1024, 64 * 1024 * 1024)? {
            self.max_body_bytes = limit;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        ConfigValidator::validate_db_path(&self.database_path)?;
        ConfigValidator::validate_listen_addr(&self.host)?;
        ConfigValidator::validate_range(self.query_timeout_seconds, 1, 300, "query_timeout_seconds")?;
        ConfigValidator::validate_range(self.max_body_bytes, 1024, 64 * 1024 * 1024, "max_body_bytes")?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::from)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_seconds)
    }

    fn default_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("dev", "songcat", "songcat")
            .ok_or(ConfigError::NoProjectDirs)?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Self::default_config_path()
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "127.0.0.1:8080");
        assert_eq!(config.query_timeout(), Duration::from_secs(10));
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert!(config.database_path.ends_with("songs.db"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "database_path = \"/tmp/catalog.db\"\nhost = \"0.0.0.0:9000\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/tmp/catalog.db"));
        assert_eq!(config.host, "0.0.0.0:9000");
        assert_eq!(config.query_timeout_seconds, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::default();
        config.database_path = dir.path().join("songs.db");
        config.query_timeout_seconds = 30;

        config.save(&path).unwrap();
        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.database_path, config.database_path);
        assert_eq!(loaded.query_timeout_seconds, 30);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "database_path = [").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SongCatalogError::Config(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SongCatalogError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_timeout() {
        let mut config = Config::default();
        config.query_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }
}
