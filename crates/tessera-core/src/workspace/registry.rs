//! Static workspace registry
//!
//! Populated at bootstrap through the service builder and read-only afterwards.

use super::types::{Workspace, WorkspaceId};
use crate::error::{LifecycleError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// Mapping from workspace id to its declaration
#[derive(Debug, Default)]
pub struct WorkspaceRegistry {
    /// All registered workspaces
    workspaces: HashMap<WorkspaceId, Arc<Workspace>>,

    /// Registration order
    order: Vec<WorkspaceId>,
}

impl WorkspaceRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a workspace to the registry
    pub fn register(&mut self, workspace: Workspace) -> Result<()> {
        if self.workspaces.contains_key(&workspace.id) {
            return Err(LifecycleError::duplicate_id(workspace.id));
        }

        let id = workspace.id.clone();
        tracing::debug!(workspace = %id, "registered workspace");
        self.workspaces.insert(id.clone(), Arc::new(workspace));
        self.order.push(id);
        Ok(())
    }

    /// Get a workspace by ID
    pub fn get(&self, id: &str) -> Result<Arc<Workspace>> {
        self.workspaces
            .get(id)
            .cloned()
            .ok_or_else(|| LifecycleError::not_found(id))
    }

    /// Workspace flagged as default, else the first registered one
    pub fn default_workspace(&self) -> Result<Arc<Workspace>> {
        let flagged = self
            .order
            .iter()
            .filter_map(|id| self.workspaces.get(id))
            .find(|ws| ws.is_default);

        flagged
            .or_else(|| self.order.first().and_then(|id| self.workspaces.get(id)))
            .cloned()
            .ok_or(LifecycleError::EmptyRegistry)
    }

    /// Check whether an id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.workspaces.contains_key(id)
    }

    /// List all workspaces in registration order
    pub fn list(&self) -> Vec<Arc<Workspace>> {
        self.order
            .iter()
            .filter_map(|id| self.workspaces.get(id).cloned())
            .collect()
    }

    /// Number of registered workspaces
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
