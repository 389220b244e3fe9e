//! Error types for Tessera Core
//!
//! Only registry lookups, registration and configuration are hard failures.
//! Handler problems are captured as [`HandlerError`] and folded into reports.

use crate::config::ConfigError;
use crate::workspace::WorkspaceId;
use thiserror::Error;

/// Result type for Tessera Core operations
pub type Result<T> = std::result::Result<T, LifecycleError>;

/// Unified error type for Tessera Core
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Unknown workspace id
    #[error("Workspace not found: {0}")]
    NotFound(WorkspaceId),

    /// Workspace id registered twice
    #[error("Workspace already registered: {0}")]
    DuplicateId(WorkspaceId),

    /// Default workspace requested but nothing was registered
    #[error("No workspaces registered")]
    EmptyRegistry,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LifecycleError {
    /// Create a not found error
    pub fn not_found(id: impl Into<WorkspaceId>) -> Self {
        LifecycleError::NotFound(id.into())
    }

    /// Create a duplicate id error
    pub fn duplicate_id(id: impl Into<WorkspaceId>) -> Self {
        LifecycleError::DuplicateId(id.into())
    }
}

impl From<ConfigError> for LifecycleError {
    fn from(err: ConfigError) -> Self {
        LifecycleError::Config(err.to_string())
    }
}

/// Error raised by a lifecycle handler or its loader
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// The handler ran and reported a failure
    #[error("{0}")]
    Failed(String),

    /// The lazy loader could not produce a handler
    #[error("handler load failed: {0}")]
    Load(String),
}

impl HandlerError {
    /// Create a handler failure
    pub fn failed(msg: impl Into<String>) -> Self {
        HandlerError::Failed(msg.into())
    }

    /// Create a loader failure
    pub fn load(msg: impl Into<String>) -> Self {
        HandlerError::Load(msg.into())
    }
}

impl From<String> for HandlerError {
    fn from(msg: String) -> Self {
        HandlerError::Failed(msg)
    }
}

impl From<&str> for HandlerError {
    fn from(msg: &str) -> Self {
        HandlerError::Failed(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LifecycleError::not_found("billing");
        assert_eq!(err.to_string(), "Workspace not found: billing");

        let err = LifecycleError::duplicate_id("billing");
        assert_eq!(err.to_string(), "Workspace already registered: billing");

        assert_eq!(
            LifecycleError::EmptyRegistry.to_string(),
            "No workspaces registered"
        );
    }

    #[test]
    fn test_handler_error_from_str() {
        let err: HandlerError = "boom".into();
        assert_eq!(err, HandlerError::failed("boom"));
        assert_eq!(HandlerError::load("missing").to_string(), "handler load failed: missing");
    }
}
