//! Lifecycle handler traits
//!
//! A handler is bound to one phase of one workspace. It is either ready at
//! registration time or produced on first use by a [`HandlerLoader`].

use super::context::HandlerContext;
use crate::error::HandlerError;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Work to run when a workspace reaches a lifecycle phase
#[async_trait]
pub trait LifecycleHandler: Send + Sync {
    /// Run the handler.
    ///
    /// Long-running handlers should watch `ctx.cancelled()`; the invoker
    /// stops awaiting them once the transition is superseded or the handler
    /// times out.
    async fn handle(&self, ctx: HandlerContext) -> Result<(), HandlerError>;
}

/// Produces a handler on first invocation
#[async_trait]
pub trait HandlerLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn LifecycleHandler>, HandlerError>;
}

/// How a handler is registered
#[derive(Clone)]
pub enum HandlerSource {
    /// Resolved eagerly at registration
    Ready(Arc<dyn LifecycleHandler>),
    /// Resolved once on first invocation, then cached
    Lazy(Arc<dyn HandlerLoader>),
}

impl std::fmt::Debug for HandlerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerSource::Ready(_) => f.write_str("HandlerSource::Ready"),
            HandlerSource::Lazy(_) => f.write_str("HandlerSource::Lazy"),
        }
    }
}

/// Handler backed by an async closure
pub struct FnHandler<F>(F);

/// Wrap an async closure as a [`LifecycleHandler`]
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    FnHandler(f)
}

#[async_trait]
impl<F, Fut> LifecycleHandler for FnHandler<F>
where
    F: Fn(HandlerContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn handle(&self, ctx: HandlerContext) -> Result<(), HandlerError> {
        (self.0)(ctx).await
    }
}

/// Loader backed by an async closure
pub struct FnLoader<F>(F);

/// Wrap an async closure producing a handler as a [`HandlerLoader`]
pub fn loader_fn<F, Fut, H>(f: F) -> FnLoader<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<H, HandlerError>> + Send + 'static,
    H: LifecycleHandler + 'static,
{
    FnLoader(f)
}

#[async_trait]
impl<F, Fut, H> HandlerLoader for FnLoader<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<H, HandlerError>> + Send + 'static,
    H: LifecycleHandler + 'static,
{
    async fn load(&self) -> Result<Arc<dyn LifecycleHandler>, HandlerError> {
        let handler = (self.0)().await?;
        Ok(Arc::new(handler))
    }
}
