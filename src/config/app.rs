//! Application configuration loading from config.toml
//!
//! Every section has serde defaults, so a partial file (or no file at all) still yields a
//! usable configuration. `DATABASE_URL` and `GOJO_BIND` from the environment take precedence
//! over the file.

use crate::errors::{Error, Result};
use crate::models::PropertyInput;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Default `SQLite` database used when neither the file nor the environment names one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/gojo.sqlite?mode=rwc";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// Browse/admin listing behaviour
    pub listing: ListingConfig,
    /// Analytics limits
    pub analytics: AnalyticsConfig,
    /// Comparison set persistence
    pub comparison: ComparisonConfig,
    /// Demo listings inserted by `gojo seed` and shown when the store is unreachable
    pub properties: Vec<PropertyInput>,
}

/// `[server]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address the HTTP API listens on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3001".to_string(),
        }
    }
}

/// `[database]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sea-orm connection URL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// `[listing]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingConfig {
    /// Page size of the public browse grid
    pub browse_page_size: usize,
    /// Page size of the admin management table
    pub admin_page_size: usize,
    /// Pull featured listings to the front on the public browse endpoint
    pub featured_first: bool,
    /// Pull featured listings to the front on the admin endpoint
    pub admin_featured_first: bool,
    /// Serve the configured demo listings when the store cannot be read
    pub demo_fallback: bool,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            browse_page_size: 12,
            admin_page_size: 9,
            featured_first: true,
            admin_featured_first: false,
            demo_fallback: true,
        }
    }
}

/// `[analytics]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Longest daily series ever produced; longer ranges are clamped
    pub max_range_days: u32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self { max_range_days: 90 }
    }
}

/// `[comparison]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Key under which the selection is persisted
    pub storage_key: String,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            storage_key: "comparison-properties".to_string(),
        }
    }
}

impl AppConfig {
    /// Parses a configuration from TOML text and validates it.
    ///
    /// # Errors
    /// Returns [`Error::Config`] if the TOML is malformed or a value is out of range.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse config.toml: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `DATABASE_URL` and `GOJO_BIND` overrides from the environment.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            debug!("DATABASE_URL overrides configured database url");
            self.database.url = url;
        }
        if let Ok(bind) = std::env::var("GOJO_BIND") {
            debug!("GOJO_BIND overrides configured bind address");
            self.server.bind = bind;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.listing.browse_page_size == 0 || self.listing.admin_page_size == 0 {
            return Err(Error::Config {
                message: "listing page sizes must be at least 1".to_string(),
            });
        }
        if self.analytics.max_range_days == 0 {
            return Err(Error::Config {
                message: "analytics.max_range_days must be at least 1".to_string(),
            });
        }
        for (index, seed) in self.properties.iter().enumerate() {
            seed.validate().map_err(|e| Error::Config {
                message: format!("seed property #{} ('{}') is invalid: {e}", index + 1, seed.title),
            })?;
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A value fails validation
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    AppConfig::from_toml_str(&contents)
}

/// Loads configuration from `path` when it exists, otherwise falls back to defaults.
/// Environment overrides are applied in both cases.
///
/// # Errors
/// Returns an error if the file exists but cannot be parsed or validated.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    let config = if path_ref.exists() {
        load_config(path_ref)?
    } else {
        info!(
            "No configuration file at {}, using defaults",
            path_ref.display()
        );
        AppConfig::default()
    };
    Ok(config.with_env_overrides())
}
