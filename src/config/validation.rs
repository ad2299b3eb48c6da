use std::net::SocketAddr;
use std::path::Path;
use crate::error::{Result, SongCatalogError};

/// Centralized configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a `host:port` listen address
    pub fn validate_listen_addr(addr: &str) -> Result<()> {
        // Hostnames such as "localhost:8080" are resolved at bind time
        if addr.parse::<SocketAddr>().is_ok() {
            return Ok(());
        }

        match addr.rsplit_once(':') {
            Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => Ok(()),
            _ => Err(SongCatalogError::Validation(format!(
                "Invalid listen address '{}': expected host:port",
                addr
            ))),
        }
    }

    /// Validate numeric range
    pub fn validate_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<()>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            return Err(SongCatalogError::Validation(format!(
                "{} must be between {} and {}, got {}",
                field_name, min, max, value
            )));
        }
        Ok(())
    }

    /// Validate database file extension
    pub fn validate_db_path(path: &Path) -> Result<()> {
        if let Some(ext) = path.extension() {
            if ext != "db" && ext != "sqlite" && ext != "sqlite3" {
                return Err(SongCatalogError::Validation(format!(
                    "Database file should have .db, .sqlite, or .sqlite3 extension, got: {}",
                    path.display()
                )));
            }
        } else {
            return Err(SongCatalogError::Validation(format!(
                "Database file should have an extension (.db, .sqlite, .sqlite3), got: {}",
                path.display()
            )));
        }
        Ok(())
    }
}
