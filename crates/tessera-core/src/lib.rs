//! Tessera Core - Workspace lifecycle library
//!
//! This crate provides the UI-agnostic core of a workspace-scoped shell:
//! - Workspace declarations and a static registry
//! - Ordered, cancellable lifecycle hooks around workspace switches
//! - The active workspace store and change subscriptions
//! - Configuration loading
//!
//! Any UI binding (router guard, navigation bar, CLI) drives it through the
//! `LifecycleService` interface.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐  activate_workspace ┌──────────────────┐
//! │   Any UI          │ ───────────────────→│  tessera-core    │
//! │ (router, nav bar) │                     │  LifecycleService│
//! │                   │ ←───────────────────│                  │
//! └───────────────────┘    Notification     └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tessera_core::{handler_fn, LifecycleConfig, LifecycleServiceBuilder, Phase, Trigger, Workspace};
//!
//! let mut builder = LifecycleServiceBuilder::new(LifecycleConfig::default())?;
//! builder.register_workspace(
//!     Workspace::new("billing", "Billing")
//!         .default_workspace()
//!         .on(Phase::AfterActivate, handler_fn(|ctx| async move {
//!             println!("entered {} from {:?}", ctx.workspace(), ctx.previous());
//!             Ok(())
//!         })),
//! )?;
//!
//! let service = builder.build();
//! let report = service.activate_default(Trigger::Programmatic).await?.settle().await;
//! ```

// Public API modules
pub mod error;
pub mod notifications;

// Configuration
pub mod config;

// Workspace declarations
pub mod workspace;

// Lifecycle engine
pub mod lifecycle;

// Active workspace state
pub mod store;

// Main service facade
pub mod service;

// Re-export commonly used types
pub use error::{HandlerError, LifecycleError, Result};
pub use notifications::Notification;
pub use service::{LifecycleService, LifecycleServiceBuilder};
pub use store::{ActiveWorkspaceState, ActiveWorkspaceStore, SubscriptionId};

// Re-export config types
pub use config::{LifecycleConfig, TesseraConfig, WorkspaceConfig};

// Re-export workspace types
pub use workspace::{RouterRef, Workspace, WorkspaceId, WorkspaceRegistry, WorkspaceView};

// Re-export lifecycle types
pub use lifecycle::{
    handler_fn, loader_fn, CancelReason, CancellationToken, HandlerContext, HandlerLoader,
    HandlerOutcome, HandlerReport, HandlerSource, LifecycleHandler, Phase, PhaseReport,
    PhaseStatus, Transition, TransitionContext, TransitionOutcome, TransitionReport, Trigger,
};

/// Get the crate version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
