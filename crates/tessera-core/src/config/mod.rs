//! Configuration module for Tessera
//!
//! Handles loading and parsing of `.tessera.toml` configuration files
//! with support for environment variable expansion.

mod loader;
mod types;

pub use loader::{
    load_config, load_from_file, sample_config, user_config_path, ConfigError,
    HANDLER_TIMEOUT_ENV, NOTIFICATION_CAPACITY_ENV,
};
pub use types::{LifecycleConfig, TesseraConfig, WorkspaceConfig};
