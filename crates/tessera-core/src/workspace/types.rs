//! Workspace type definitions
//!
//! A workspace is declared once at bootstrap and never changes afterwards.

use crate::lifecycle::{HandlerLoader, HandlerSource, LifecycleHandler, Phase};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::sync::Arc;

/// Unique, stable workspace identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(String);

impl WorkspaceId {
    /// Create an id from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WorkspaceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for WorkspaceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&WorkspaceId> for WorkspaceId {
    fn from(id: &WorkspaceId) -> Self {
        id.clone()
    }
}

impl Borrow<str> for WorkspaceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Opaque reference to the router that serves a workspace
///
/// The lifecycle core never interprets it; it is carried for UI bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouterRef(pub Option<String>);

impl RouterRef {
    /// Create a router reference
    pub fn new(target: impl Into<String>) -> Self {
        Self(Some(target.into()))
    }

    /// The raw router target, if any
    pub fn target(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// A routable section of the application with its own lifecycle hooks
#[derive(Clone)]
pub struct Workspace {
    /// Unique identifier
    pub id: WorkspaceId,

    /// Human-readable name
    pub name: String,

    /// Icon reference for display
    pub icon: Option<String>,

    /// Whether this is the workspace to open when nothing else is requested
    pub is_default: bool,

    /// Whether this workspace is reachable without authentication
    pub is_public: bool,

    /// Router reference (opaque to the core)
    pub router: RouterRef,

    /// Handlers per phase, in registration order
    lifecycle: HashMap<Phase, Vec<HandlerSource>>,
}

impl Workspace {
    /// Create a workspace with no handlers
    pub fn new(id: impl Into<WorkspaceId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: None,
            is_default: false,
            is_public: false,
            router: RouterRef::default(),
            lifecycle: HashMap::new(),
        }
    }

    /// Set the icon reference
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Mark as the default workspace
    pub fn default_workspace(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// Mark as public
    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    /// Attach a router reference
    pub fn with_router(mut self, router: RouterRef) -> Self {
        self.router = router;
        self
    }

    /// Register a ready handler for a phase
    pub fn on(mut self, phase: Phase, handler: impl LifecycleHandler + 'static) -> Self {
        self.push_source(phase, HandlerSource::Ready(Arc::new(handler)));
        self
    }

    /// Register a lazily loaded handler for a phase
    pub fn on_lazy(mut self, phase: Phase, loader: impl HandlerLoader + 'static) -> Self {
        self.push_source(phase, HandlerSource::Lazy(Arc::new(loader)));
        self
    }

    /// Register an existing handler source for a phase
    pub fn push_source(&mut self, phase: Phase, source: HandlerSource) {
        self.lifecycle.entry(phase).or_default().push(source);
    }

    /// Handlers registered for a phase
    pub fn handlers(&self, phase: Phase) -> &[HandlerSource] {
        self.lifecycle.get(&phase).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether any handler is registered for a phase
    pub fn has_handlers(&self, phase: Phase) -> bool {
        !self.handlers(phase).is_empty()
    }
}

impl std::fmt::Debug for Workspace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phases: Vec<_> = Phase::ALL
            .iter()
            .filter(|p| self.has_handlers(**p))
            .map(|p| p.as_str())
            .collect();
        f.debug_struct("Workspace")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("is_default", &self.is_default)
            .field("is_public", &self.is_public)
            .field("router", &self.router)
            .field("phases", &phases)
            .finish()
    }
}

/// Summary view of a workspace for listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceView {
    pub id: WorkspaceId,
    pub name: String,
    pub icon: Option<String>,
    pub is_default: bool,
    pub is_public: bool,
    pub router: RouterRef,
    pub is_active: bool,
}

impl WorkspaceView {
    /// Build a view, marking it active when it matches `active`
    pub fn new(ws: &Workspace, active: Option<&WorkspaceId>) -> Self {
        Self {
            id: ws.id.clone(),
            name: ws.name.clone(),
            icon: ws.icon.clone(),
            is_default: ws.is_default,
            is_public: ws.is_public,
            router: ws.router.clone(),
            is_active: active == Some(&ws.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{handler_fn, HandlerContext};

    #[test]
    fn test_workspace_id_serializes_as_string() {
        let id = WorkspaceId::from("billing");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"billing\"");
        let parsed: WorkspaceId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_builder_collects_handlers_per_phase() {
        let ws = Workspace::new("billing", "Billing")
            .with_icon("receipt")
            .default_workspace()
            .on(Phase::BeforeActivate, handler_fn(|_: HandlerContext| async { Ok(()) }))
            .on(Phase::BeforeActivate, handler_fn(|_: HandlerContext| async { Ok(()) }));

        assert!(ws.is_default);
        assert!(!ws.is_public);
        assert_eq!(ws.handlers(Phase::BeforeActivate).len(), 2);
        assert!(!ws.has_handlers(Phase::AfterActivate));
    }

    #[test]
    fn test_view_marks_active() {
        let ws = Workspace::new("billing", "Billing").with_router(RouterRef::new("/billing"));
        let id = WorkspaceId::from("billing");

        let view = WorkspaceView::new(&ws, Some(&id));
        assert!(view.is_active);
        assert_eq!(view.router.target(), Some("/billing"));

        let view = WorkspaceView::new(&ws, None);
        assert!(!view.is_active);
    }
}
