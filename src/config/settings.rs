//! Application settings loaded from a TOML file.
//!
//! Every key has a default, so a missing file yields a working configuration.
//! `DATABASE_URL` in the environment (or `.env`) takes precedence over the
//! file's `database_url`.

use crate::config::database::{DEFAULT_DATABASE_URL, get_database_url};
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an alternative settings file.
pub const CONFIG_PATH_VAR: &str = "INVOICER_CONFIG";

/// Settings file used when `INVOICER_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `SeaORM` connection URL
    pub database_url: String,
    /// Prefix used when generating invoice numbers
    pub invoice_prefix: String,
    /// Directory receiving CSV and HTML exports when no path is given
    pub export_dir: PathBuf,
    /// Seller details printed on invoices
    pub company: CompanyConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            invoice_prefix: "INV".to_string(),
            export_dir: PathBuf::from("exports"),
            company: CompanyConfig::default(),
        }
    }
}

/// Seller block of the printable invoice
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CompanyConfig {
    /// Company name shown as the brand
    pub name: String,
    /// Address lines shown under the name
    pub address_lines: Vec<String>,
    /// Closing line at the bottom of the document
    pub footer: String,
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            name: "YOUR COMPANY".to_string(),
            address_lines: vec!["Address line 1".to_string(), "City, Country".to_string()],
            footer: "Thank you for your business.".to_string(),
        }
    }
}

/// Parses configuration from TOML text.
///
/// # Errors
/// Returns `Error::Config` if the TOML is malformed or a key has the wrong type.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse configuration: {e}"),
    })
}

/// Loads configuration from `path`. A missing file yields the defaults.
///
/// # Errors
/// Returns `Error::Config` if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!("No configuration file at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }

    debug!("Loading configuration from {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `INVOICER_CONFIG` or `./config.toml`, then applies the
/// `DATABASE_URL` override.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = load_config(&path)?;
    config.database_url = get_database_url(&config.database_url);
    Ok(config)
}
