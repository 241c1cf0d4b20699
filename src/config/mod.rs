/// Admin identity for the login endpoint and the Discord allowlist
pub mod admins;

/// Application configuration loading from config.toml
pub mod app;

/// Database configuration and connection management
pub mod database;

pub use admins::AdminConfig;
pub use app::{AppConfig, ServerConfig, StoreConfig, StorefrontConfig};
