//! Application configuration loading from config.toml
//!
//! Every section has defaults, so a missing file yields a working development setup.
//! Secrets (bot token, admin password hash) never live here; they come from the environment.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Store behavior (seeding, paging, simulated payment settle time)
    pub store: StoreConfig,
    /// Values seeded into the settings table
    pub storefront: StorefrontConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Store behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Seed brands, files, packages, customers and ledger on an empty database
    pub seed_demo_data: bool,
    /// Simulated payment settle delay in milliseconds
    pub purchase_settle_ms: u64,
    /// Page size when a caller does not ask for one
    pub default_page_size: u64,
    /// Upper bound for caller-provided page sizes
    pub max_page_size: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_demo_data: true,
            purchase_settle_ms: 1500,
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}

impl StoreConfig {
    /// Settle delay as a `Duration`.
    #[must_use]
    pub const fn purchase_settle_delay(&self) -> Duration {
        Duration::from_millis(self.purchase_settle_ms)
    }
}

/// Storefront identity, seeded into the settings table on first start
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Public site name
    pub site_name: String,
    /// Legal company name
    pub company_name: String,
    /// Support contact address
    pub support_email: String,
    /// ISO currency code used when formatting prices
    pub currency: String,
    /// Admin session timeout shown on the settings screen
    pub session_timeout_minutes: u32,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            site_name: "AutoTechno".to_string(),
            company_name: "AutoTechno Ltd.".to_string(),
            support_email: "support@autotechno.com".to_string(),
            currency: "EUR".to_string(),
            session_timeout_minutes: 30,
        }
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    debug!("Attempting to load configuration from: {:?}", path.as_ref());
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    parse_config(&contents)
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from the path in `CONFIG_PATH` (default `./config.toml`).
///
/// A missing file falls back to defaults; a present but broken file is an error.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if Path::new(&path).exists() {
        load_config(&path)
    } else {
        warn!("No configuration file at {path}, using defaults");
        Ok(AppConfig::default())
    }
}
