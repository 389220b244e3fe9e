//! Configuration types for Tessera
//!
//! Defines the structure of `.tessera.toml`.

use super::loader::ConfigError;
use crate::workspace::{RouterRef, Workspace};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TesseraConfig {
    /// Lifecycle settings
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Workspace declarations, in registration order
    #[serde(default)]
    pub workspaces: Vec<WorkspaceConfig>,
}

/// Lifecycle configuration section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    /// Per-handler timeout in milliseconds
    #[serde(default = "default_handler_timeout_ms")]
    pub handler_timeout_ms: u64,

    /// Capacity of the notification channel
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
}

fn default_handler_timeout_ms() -> u64 {
    10_000
}

fn default_notification_capacity() -> usize {
    1000
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            handler_timeout_ms: default_handler_timeout_ms(),
            notification_capacity: default_notification_capacity(),
        }
    }
}

impl LifecycleConfig {
    /// Handler timeout as a duration
    pub fn handler_timeout(&self) -> Duration {
        Duration::from_millis(self.handler_timeout_ms)
    }

    /// Reject settings the lifecycle cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.handler_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "handler_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.notification_capacity == 0 {
            return Err(ConfigError::Invalid(
                "notification_capacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Declarative workspace entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Unique identifier
    pub id: String,

    /// Human-readable name (defaults to the id)
    #[serde(default)]
    pub name: Option<String>,

    /// Icon reference
    #[serde(default)]
    pub icon: Option<String>,

    /// Open this workspace when nothing else is requested
    #[serde(default)]
    pub default: bool,

    /// Reachable without authentication
    #[serde(default)]
    pub public: bool,

    /// Router reference (supports ${ENV_VAR} syntax)
    #[serde(default)]
    pub router: Option<String>,
}

impl WorkspaceConfig {
    /// Build a workspace declaration without handlers
    pub fn to_workspace(&self) -> Workspace {
        let name = self.name.clone().unwrap_or_else(|| self.id.clone());
        let mut workspace = Workspace::new(self.id.as_str(), name)
            .with_router(RouterRef(self.router.clone()));
        if let Some(icon) = &self.icon {
            workspace = workspace.with_icon(icon.clone());
        }
        if self.default {
            workspace = workspace.default_workspace();
        }
        if self.public {
            workspace = workspace.public();
        }
        workspace
    }
}
