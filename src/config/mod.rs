/// Application settings loaded from config.toml and the environment
pub mod app;

/// Database configuration and connection management
pub mod database;

pub use app::{AppConfig, load_config, load_config_or_default};
pub use database::{connect_read_only, init_database};
