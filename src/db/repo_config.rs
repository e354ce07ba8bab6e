//! Repository and policy configuration file support.
//!
//! This module provides utilities for reading configuration from TOML files,
//! with environment variables taking precedence for the repository backend.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::factory::RepositoryType;
use super::repository::RepositoryError;

/// Configuration loaded from `academy.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub booking: BookingPolicy,
    #[serde(default)]
    pub server: ServerSettings,
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default = "default_repo_type")]
    pub repo_type: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: default_repo_type(),
        }
    }
}

fn default_repo_type() -> String {
    "local".to_string()
}

/// Booking/session policy knobs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookingPolicy {
    /// Whether a deferral-requested session consumes one of the student's
    /// per-period sessions. The academy's default is that it does not.
    #[serde(default)]
    pub deferral_consumes_quota: bool,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            deferral_consumes_quota: false,
        }
    }
}

/// HTTP server bind settings, overridable via `HOST`/`PORT` env vars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl RepositoryConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(RepositoryConfig)` if successful
    /// * `Err(RepositoryError)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        let config: RepositoryConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load configuration from the default locations.
    ///
    /// Searches for `academy.toml` in the current directory, then the parent
    /// directory. Falls back to defaults when no file is found.
    pub fn load() -> Self {
        for path in Self::default_locations() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return config,
                    Err(e) => {
                        log::warn!("Ignoring unreadable config {}: {}", path.display(), e);
                    }
                }
            }
        }
        Self::default()
    }

    fn default_locations() -> Vec<PathBuf> {
        vec![PathBuf::from("academy.toml"), PathBuf::from("../academy.toml")]
    }

    /// Resolve the repository backend, with `REPOSITORY_TYPE` env taking
    /// precedence over the file.
    pub fn repository_type(&self) -> Result<RepositoryType, RepositoryError> {
        if let Ok(from_env) = std::env::var("REPOSITORY_TYPE") {
            return RepositoryType::from_str(&from_env)
                .map_err(RepositoryError::ConfigurationError);
        }
        RepositoryType::from_str(&self.repository.repo_type)
            .map_err(RepositoryError::ConfigurationError)
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            repository: RepositorySettings::default(),
            booking: BookingPolicy::default(),
            server: ServerSettings::default(),
        }
    }
}
