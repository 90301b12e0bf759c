//! Portal configuration loading from config.toml
//!
//! The file is optional. When present it may list `[[vaccines]]` entries that
//! are seeded into the catalog on startup so a fresh database is usable at once.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::warn;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Vaccines to seed into the catalog
    #[serde(default)]
    pub vaccines: Vec<VaccineSeed>,
}

/// Configuration for a single catalog vaccine
#[derive(Debug, Deserialize, Clone)]
pub struct VaccineSeed {
    /// Name of the vaccine
    pub name: String,
    /// Description shown next to the name
    pub description: String,
}

/// Loads portal configuration from a TOML file
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from `PORTAL_CONFIG` (default `./config.toml`).
///
/// A missing file yields an empty configuration; a malformed one is an error.
pub fn load_default_config() -> Result<Config> {
    let path = std::env::var("PORTAL_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
    if !Path::new(&path).exists() {
        warn!("No configuration file at {}, starting with an empty catalog seed", path);
        return Ok(Config::default());
    }
    load_config(path)
}
