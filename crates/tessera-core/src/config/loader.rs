//! Configuration loader with environment variable expansion
//!
//! Loads configuration from `.tessera.toml` in the project root or the user
//! config directory.

use super::types::TesseraConfig;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Environment variable overriding `lifecycle.handler_timeout_ms`
pub const HANDLER_TIMEOUT_ENV: &str = "TESSERA_HANDLER_TIMEOUT_MS";

/// Environment variable overriding `lifecycle.notification_capacity`
pub const NOTIFICATION_CAPACITY_ENV: &str = "TESSERA_NOTIFICATION_CAPACITY";

/// Configuration loading error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: String, value: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Load configuration from various sources
///
/// Priority order:
/// 1. Project-level `.tessera.toml`
/// 2. User-level `~/.config/tessera/config.toml`
/// 3. Default configuration
///
/// Environment overrides apply on top of whichever source was used.
pub fn load_config(project_dir: &Path) -> Result<TesseraConfig, ConfigError> {
    let project_config = project_dir.join(".tessera.toml");
    if project_config.exists() {
        return load_from_file(&project_config);
    }

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            return load_from_file(&user_config);
        }
    }

    finish(TesseraConfig::default())
}

/// Get user config file path
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tessera").join("config.toml"))
}

/// Load configuration from a specific file
pub fn load_from_file(path: &Path) -> Result<TesseraConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut config: TesseraConfig = toml::from_str(&content)?;
    expand_env_vars(&mut config, &env_lookup);
    finish(config)
}

fn finish(config: TesseraConfig) -> Result<TesseraConfig, ConfigError> {
    let config = apply_env_overrides(config, &env_lookup)?;
    config.lifecycle.validate()?;
    Ok(config)
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn env_regex() -> &'static Regex {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    ENV_VAR.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"))
}

/// Expand ${VAR} patterns in workspace string values
fn expand_env_vars(config: &mut TesseraConfig, lookup: &dyn Fn(&str) -> Option<String>) {
    for workspace in &mut config.workspaces {
        for value in [
            &mut workspace.name,
            &mut workspace.icon,
            &mut workspace.router,
        ] {
            if let Some(s) = value.as_mut() {
                *s = expand_string(s, lookup);
            }
        }
    }
}

/// Expand environment variables in a single string
///
/// Unknown variables are left as written.
fn expand_string(s: &str, lookup: &dyn Fn(&str) -> Option<String>) -> String {
    env_regex()
        .replace_all(s, |caps: &regex::Captures| {
            let var_name = &caps[1];
            lookup(var_name).unwrap_or_else(|| format!("${{{}}}", var_name))
        })
        .to_string()
}

/// Apply environment variable overrides
///
/// Supports:
/// - TESSERA_HANDLER_TIMEOUT_MS -> lifecycle.handler_timeout_ms
/// - TESSERA_NOTIFICATION_CAPACITY -> lifecycle.notification_capacity
fn apply_env_overrides(
    mut config: TesseraConfig,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<TesseraConfig, ConfigError> {
    if let Some(value) = lookup(HANDLER_TIMEOUT_ENV).filter(|v| !v.is_empty()) {
        config.lifecycle.handler_timeout_ms =
            value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: HANDLER_TIMEOUT_ENV.to_string(),
                value: value.clone(),
            })?;
    }

    if let Some(value) = lookup(NOTIFICATION_CAPACITY_ENV).filter(|v| !v.is_empty()) {
        config.lifecycle.notification_capacity =
            value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: NOTIFICATION_CAPACITY_ENV.to_string(),
                value: value.clone(),
            })?;
    }

    Ok(config)
}

/// Generate a sample configuration file
pub fn sample_config() -> &'static str {
    r#"# Tessera Configuration
# Place this file at .tessera.toml in your project root
# or ~/.config/tessera/config.toml

[lifecycle]
# Per-handler timeout (overridden by TESSERA_HANDLER_TIMEOUT_MS)
handler_timeout_ms = 10000
notification_capacity = 1000

[[workspaces]]
id = "home"
name = "Home"
icon = "house"
default = true
public = true
router = "/"

[[workspaces]]
id = "billing"
name = "Billing"
icon = "receipt"
router = "${BILLING_ROUTE}"
"#
}
