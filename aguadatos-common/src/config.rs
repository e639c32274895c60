//! Configuration loading and resolution
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument or environment variable (handled by the binary)
//! 2. TOML config file
//! 3. Compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_DATABASE: &str = "aguadatos.db";

/// Settings as they appear in the TOML config file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub debug: Option<bool>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub debug: bool,
}

/// Fully resolved process settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// SQLite URL (`sqlite:...`) or file path
    pub database: String,
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: DEFAULT_DATABASE.to_string(),
            debug: false,
        }
    }
}

impl Settings {
    /// Merge overrides over file values over defaults
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Self {
        let defaults = Settings::default();
        Self {
            host: overrides.host.or(file.host).unwrap_or(defaults.host),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            database: overrides
                .database
                .or(file.database)
                .unwrap_or(defaults.database),
            debug: overrides.debug || file.debug.unwrap_or(defaults.debug),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Load a TOML config file
pub fn load_config_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Parse TOML config content
pub fn parse_config(content: &str) -> Result<FileConfig> {
    toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
}
