//! Workspace declarations and registry
//!
//! # Architecture
//!
//! ```text
//! LifecycleServiceBuilder
//!     │ register_workspace()
//!     ▼
//! WorkspaceRegistry (frozen after build)
//!     └── HashMap<WorkspaceId, Arc<Workspace>>
//!             └── Phase → Vec<HandlerSource>
//! ```

mod registry;
mod types;

pub use registry::WorkspaceRegistry;
pub use types::{RouterRef, Workspace, WorkspaceId, WorkspaceView};
