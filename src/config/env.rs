use std::env;
use std::path::PathBuf;
use crate::error::{Result, SongCatalogError};

/// Environment variable configuration constants
pub struct EnvVars;

impl EnvVars {
    pub const DATABASE_PATH: &'static str = "SONGCAT_DATABASE_PATH";
    pub const HOST: &'static str = "SONGCAT_HOST";
    pub const QUERY_TIMEOUT_SECONDS: &'static str = "SONGCAT_QUERY_TIMEOUT_SECONDS";
    pub const MAX_BODY_BYTES: &'static str = "SONGCAT_MAX_BODY_BYTES";

    // Special environment variables
    pub const DOCKER: &'static str = "DOCKER";
    pub const LEGACY_HOST: &'static str = "HOST";
}

/// Environment variable parsing utilities with validation
pub struct EnvParser;

impl EnvParser {
    /// Parse environment variable as string with validation
    pub fn parse_string(var_name: &str, validator: Option<fn(&str) -> Result<()>>) -> Result<Option<String>> {
        match env::var(var_name) {
            Ok(value) => {
                let trimmed = value.trim().to_string();
                if trimmed.is_empty() {
                    return Ok(None);
                }

                if let Some(validate_fn) = validator {
                    validate_fn(&trimmed)?;
                }

                Ok(Some(trimmed))
            }
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => {
                Err(SongCatalogError::Validation(format!(
                    "Environment variable {} contains invalid UTF-8",
                    var_name
                )))
            }
        }
    }

    /// Parse environment variable as PathBuf with validation
    pub fn parse_path(var_name: &str, should_exist: bool) -> Result<Option<PathBuf>> {
        if let Some(path_str) = Self::parse_string(var_name, None)? {
            let path = PathBuf::from(path_str);

            if should_exist && !path.exists() {
                return Err(SongCatalogError::Validation(format!(
                    "Path specified in {} does not exist: {}",
                    var_name,
                    path.display()
                )));
            }

            Ok(Some(path))
        } else {
            Ok(None)
        }
    }

    /// Parse environment variable as u64 with range validation
    pub fn parse_u64(var_name: &str, min: u64, max: u64) -> Result<Option<u64>> {
        if let Some(value_str) = Self::parse_string(var_name, None)? {
            let value = value_str.parse::<u64>().map_err(|_| {
                SongCatalogError::Validation(format!(
                    "Invalid number in {}: '{}'. Must be a positive integer",
                    var_name, value_str
                ))
            })?;

            if value < min || value > max {
                return Err(SongCatalogError::Validation(format!(
                    "Value in {} must be between {} and {}, got {}",
                    var_name, min, max, value
                )));
            }

            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    /// Parse environment variable as usize with range validation
    pub fn parse_usize(var_name: &str, min: usize, max: usize) -> Result<Option<usize>> {
        match Self::parse_u64(var_name, min as u64, max as u64)? {
            Some(value) => Ok(Some(value as usize)),
            None => Ok(None),
        }
    }

    /// Check if environment variable is present (for boolean flags)
    pub fn is_present(var_name: &str) -> bool {
        env::var(var_name).is_ok()
    }

    /// All `SONGCAT_*` variables currently set, sorted by name
    pub fn get_all_songcat_vars() -> Vec<(String, String)> {
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(key, _)| key.starts_with("SONGCAT_"))
            .collect();
        vars.sort();
        vars
    }
}
