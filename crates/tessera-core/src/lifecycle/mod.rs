//! Workspace lifecycle
//!
//! Runs ordered, cancellable hooks when the active workspace changes.
//!
//! # Architecture
//!
//! ```text
//! TransitionController
//!     │  one sequence number + one CancellationToken per attempt
//!     ├── HandlerInvoker ── LifecycleHandler (ready or lazily loaded)
//!     │        └── timeout, failure capture, detach on cancel
//!     └── ActiveWorkspaceStore (written only on commit)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tessera_core::lifecycle::{handler_fn, Phase, Trigger};
//! use tessera_core::Workspace;
//!
//! let billing = Workspace::new("billing", "Billing")
//!     .on(Phase::BeforeDeactivate, handler_fn(|ctx| async move {
//!         if ctx.is_cancelled() {
//!             return Ok(());
//!         }
//!         flush_drafts().await.map_err(|e| e.to_string().into())
//!     }));
//! ```

mod cancel;
mod context;
mod controller;
mod handler;
mod invoker;
mod types;

pub use cancel::{CancelReason, CancellationToken};
pub use context::{HandlerContext, TransitionContext};
pub use controller::{PostCommit, Transition, TransitionController};
pub use handler::{
    handler_fn, loader_fn, FnHandler, FnLoader, HandlerLoader, HandlerSource, LifecycleHandler,
};
pub use invoker::HandlerInvoker;
pub use types::{
    HandlerOutcome, HandlerReport, Phase, PhaseReport, PhaseStatus, Trigger, TransitionOutcome,
    TransitionReport,
};
