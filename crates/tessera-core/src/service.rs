//! LifecycleService - Main backend facade
//!
//! This module provides the interface UI bindings use to drive workspace
//! switches. It wraps the registry, the active workspace store and the
//! transition controller, and emits notifications over a bounded channel.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐  activate_workspace ┌────────────────────┐
//! │   Any UI          │ ───────────────────→│  LifecycleService  │
//! │ (router, nav bar) │                     │                    │
//! │                   │ ←───────────────────│  (Controller)      │
//! └───────────────────┘    Notification     └────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tessera_core::{LifecycleConfig, LifecycleServiceBuilder, Trigger, Workspace};
//!
//! let mut builder = LifecycleServiceBuilder::new(LifecycleConfig::default())?;
//! builder.register_workspace(Workspace::new("home", "Home").default_workspace())?;
//! let service = builder.build();
//!
//! service.activate_default(Trigger::Programmatic).await?;
//! while let Some(notif) = service.poll_notification() {
//!     println!("{:?}", notif);
//! }
//! ```

use crate::config::{LifecycleConfig, TesseraConfig};
use crate::error::Result;
use crate::lifecycle::{HandlerInvoker, Transition, TransitionController, Trigger};
use crate::notifications::{Notification, Notifier};
use crate::store::{ActiveWorkspaceStore, SubscriptionId};
use crate::workspace::{Workspace, WorkspaceId, WorkspaceRegistry, WorkspaceView};
use crossbeam_channel::{bounded, Receiver};
use std::sync::Arc;

/// Collects workspaces before the registry is frozen
#[derive(Debug)]
pub struct LifecycleServiceBuilder {
    config: LifecycleConfig,
    registry: WorkspaceRegistry,
}

impl LifecycleServiceBuilder {
    /// Create a builder, rejecting unusable lifecycle settings
    pub fn new(config: LifecycleConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            registry: WorkspaceRegistry::new(),
        })
    }

    /// Create a builder and register every declared workspace
    ///
    /// Declared workspaces carry no handlers; use
    /// [`from_config_with`](Self::from_config_with) to attach them.
    pub fn from_config(config: &TesseraConfig) -> Result<Self> {
        Self::from_config_with(config, |workspace| workspace)
    }

    /// Like [`from_config`](Self::from_config), passing each declared
    /// workspace through `attach` before it is registered
    pub fn from_config_with<F>(config: &TesseraConfig, mut attach: F) -> Result<Self>
    where
        F: FnMut(Workspace) -> Workspace,
    {
        let mut builder = Self::new(config.lifecycle.clone())?;
        for entry in &config.workspaces {
            builder.register_workspace(attach(entry.to_workspace()))?;
        }
        Ok(builder)
    }

    /// Add a workspace; ids must be unique
    pub fn register_workspace(&mut self, workspace: Workspace) -> Result<()> {
        self.registry.register(workspace)
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Freeze the registry and start the service
    pub fn build(self) -> LifecycleService {
        let (notification_tx, notification_rx) = bounded(self.config.notification_capacity);

        let registry = Arc::new(self.registry);
        let store = Arc::new(ActiveWorkspaceStore::new());
        let invoker = Arc::new(HandlerInvoker::new(self.config.handler_timeout()));
        let controller = TransitionController::new(
            Arc::clone(&registry),
            Arc::clone(&store),
            invoker,
            Notifier::new(notification_tx),
        );

        tracing::debug!(
            workspaces = registry.len(),
            timeout_ms = self.config.handler_timeout_ms,
            "lifecycle service started"
        );

        LifecycleService {
            controller,
            notification_rx,
            config: self.config,
        }
    }
}

/// Main lifecycle facade
#[derive(Debug)]
pub struct LifecycleService {
    /// Transition controller (owns registry and store handles)
    controller: TransitionController,

    /// Notification receiver (for UI to poll)
    notification_rx: Receiver<Notification>,

    /// Lifecycle configuration
    config: LifecycleConfig,
}

impl LifecycleService {
    /// Request a switch to `id`
    pub async fn activate_workspace(&self, id: &str, trigger: Trigger) -> Result<Transition> {
        self.controller.request_transition(id, trigger).await
    }

    /// Request a switch to the default workspace
    ///
    /// Fails with `EmptyRegistry` when nothing was registered.
    pub async fn activate_default(&self, trigger: Trigger) -> Result<Transition> {
        let default = self.registry().default_workspace()?;
        self.controller
            .request_transition(default.id.as_str(), trigger)
            .await
    }

    /// Cancel the transition currently before its commit
    pub fn cancel_pending(&self) -> bool {
        self.controller.cancel_pending()
    }

    /// Currently active workspace
    pub fn active_workspace(&self) -> Option<WorkspaceId> {
        self.store().current()
    }

    /// Views of all registered workspaces, in registration order
    pub fn list_workspaces(&self) -> Vec<WorkspaceView> {
        let active = self.active_workspace();
        self.registry()
            .list()
            .iter()
            .map(|ws| WorkspaceView::new(ws, active.as_ref()))
            .collect()
    }

    /// Call `callback` after every committed switch
    pub fn on_active_workspace_change<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&WorkspaceId) + Send + Sync + 'static,
    {
        self.store().subscribe(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store().unsubscribe(id)
    }

    /// Poll for a notification (non-blocking)
    pub fn poll_notification(&self) -> Option<Notification> {
        self.notification_rx.try_recv().ok()
    }

    /// Get the notification receiver for select-based polling
    pub fn notifications(&self) -> &Receiver<Notification> {
        &self.notification_rx
    }

    pub fn store(&self) -> &Arc<ActiveWorkspaceStore> {
        self.controller.store()
    }

    pub fn registry(&self) -> &Arc<WorkspaceRegistry> {
        self.controller.registry()
    }

    pub fn controller(&self) -> &TransitionController {
        &self.controller
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorkspaceConfig;
    use crate::error::{HandlerError, LifecycleError};
    use crate::lifecycle::{handler_fn, HandlerContext, Phase, TransitionOutcome};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn service(workspaces: Vec<Workspace>) -> LifecycleService {
        let mut builder = LifecycleServiceBuilder::new(LifecycleConfig::default()).unwrap();
        for ws in workspaces {
            builder.register_workspace(ws).unwrap();
        }
        builder.build()
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = LifecycleConfig {
            notification_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            LifecycleServiceBuilder::new(config),
            Err(LifecycleError::Config(_))
        ));
    }

    #[test]
    fn test_builder_rejects_duplicate_workspace() {
        let mut builder = LifecycleServiceBuilder::new(LifecycleConfig::default()).unwrap();
        builder
            .register_workspace(Workspace::new("a", "A"))
            .unwrap();
        assert!(matches!(
            builder.register_workspace(Workspace::new("a", "Again")),
            Err(LifecycleError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_from_config_registers_declared_workspaces() {
        let config = TesseraConfig {
            lifecycle: LifecycleConfig::default(),
            workspaces: vec![
                WorkspaceConfig {
                    id: "home".into(),
                    name: Some("Home".into()),
                    icon: None,
                    default: true,
                    public: true,
                    router: None,
                },
                WorkspaceConfig {
                    id: "billing".into(),
                    name: None,
                    icon: None,
                    default: false,
                    public: false,
                    router: Some("/billing".into()),
                },
            ],
        };
        let service = LifecycleServiceBuilder::from_config(&config)
            .unwrap()
            .build();

        let ids: Vec<_> = service
            .list_workspaces()
            .into_iter()
            .map(|view| view.id.to_string())
            .collect();
        assert_eq!(ids, vec!["home".to_string(), "billing".to_string()]);
    }

    #[tokio::test]
    async fn test_from_config_with_attaches_handlers() {
        let config = TesseraConfig {
            lifecycle: LifecycleConfig::default(),
            workspaces: vec![WorkspaceConfig {
                id: "home".into(),
                name: None,
                icon: None,
                default: true,
                public: false,
                router: None,
            }],
        };
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let service = LifecycleServiceBuilder::from_config_with(&config, |ws| {
            let counter = Arc::clone(&counter);
            ws.on(
                Phase::BeforeActivate,
                handler_fn(move |_: HandlerContext| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    async { Ok(()) }
                }),
            )
        })
        .unwrap()
        .build();

        let transition = service
            .activate_default(Trigger::Programmatic)
            .await
            .unwrap();
        assert_eq!(transition.outcome(), TransitionOutcome::Committed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_activate_default_on_empty_registry() {
        let service = service(Vec::new());
        assert!(matches!(
            service.activate_default(Trigger::Programmatic).await,
            Err(LifecycleError::EmptyRegistry)
        ));
    }

    #[tokio::test]
    async fn test_activate_default_prefers_flagged_workspace() {
        let service = service(vec![
            Workspace::new("a", "A"),
            Workspace::new("b", "B").default_workspace(),
        ]);

        let transition = service
            .activate_default(Trigger::Programmatic)
            .await
            .unwrap();
        assert_eq!(transition.outcome(), TransitionOutcome::Committed);
        assert_eq!(service.active_workspace(), Some(WorkspaceId::from("b")));

        let views = service.list_workspaces();
        assert!(!views[0].is_active);
        assert!(views[1].is_active);
    }

    #[tokio::test]
    async fn test_notifications_follow_transition() {
        let service = service(vec![Workspace::new("a", "A"), Workspace::new("b", "B")]);

        service
            .activate_workspace("a", Trigger::Navigation)
            .await
            .unwrap()
            .settle()
            .await;

        assert_eq!(
            service.poll_notification(),
            Some(Notification::workspace_activated(WorkspaceId::from("a"), 1))
        );
        assert!(matches!(
            service.poll_notification(),
            Some(Notification::TransitionSettled { report })
                if report.outcome == TransitionOutcome::Committed
        ));
        assert!(service.poll_notification().is_none());
    }

    #[tokio::test]
    async fn test_subscription_lifecycle() {
        let service = service(vec![Workspace::new("a", "A"), Workspace::new("b", "B")]);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let subscription = service.on_active_workspace_change(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        service.activate_workspace("a", Trigger::Programmatic).await.unwrap();
        assert!(service.unsubscribe(subscription));
        service.activate_workspace("b", Trigger::Programmatic).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!service.unsubscribe(subscription));
    }

    #[tokio::test]
    async fn test_degraded_phase_is_notified() {
        let service = service(vec![
            Workspace::new("a", "A"),
            Workspace::new("b", "B").on(
                Phase::BeforeActivate,
                handler_fn(|_: HandlerContext| async {
                    Err(HandlerError::failed("warmup failed"))
                }),
            ),
        ]);

        service.activate_workspace("a", Trigger::Programmatic).await.unwrap();
        let report = service
            .activate_workspace("b", Trigger::Navigation)
            .await
            .unwrap()
            .settle()
            .await;
        assert_eq!(report.outcome, TransitionOutcome::Committed);
        assert!(report.is_degraded());

        let degraded: Vec<_> = service
            .notifications()
            .try_iter()
            .filter_map(|n| match n {
                Notification::PhaseDegraded { sequence, report } => Some((sequence, report.phase)),
                _ => None,
            })
            .collect();
        assert_eq!(degraded, vec![(2, Phase::BeforeActivate)]);
    }
}
