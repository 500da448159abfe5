//! Infrastructure layer: SQLite persistence and configuration.

pub mod config;
pub mod db;

pub use config::{AppConfig, BootstrapAdmin, ConfigError};
pub use db::{CatalogError, ProvisionError, SqliteStore};
