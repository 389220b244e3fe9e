//! Handler invocation
//!
//! Runs every handler of a phase group concurrently, enforces the timeout and
//! turns errors into report entries. Nothing here ever fails the caller.

use super::cancel::CancelReason;
use super::context::{HandlerContext, TransitionContext};
use super::handler::{HandlerSource, LifecycleHandler};
use super::types::{HandlerOutcome, HandlerReport, Phase, PhaseReport};
use crate::error::HandlerError;
use crate::workspace::{Workspace, WorkspaceId};
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::OnceCell;

type Slot = OnceCell<Arc<dyn LifecycleHandler>>;

/// Resolves and runs lifecycle handlers
pub struct HandlerInvoker {
    /// Budget for load + run of a single handler
    timeout: Duration,

    /// Resolved lazy handlers, one slot per registered handler
    resolved: Mutex<HashMap<(WorkspaceId, Phase), Arc<[Slot]>>>,
}

impl HandlerInvoker {
    /// Create an invoker with the given per-handler timeout
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the handlers registered on `workspace` for `phase`
    pub async fn invoke(
        &self,
        workspace: &Workspace,
        phase: Phase,
        transition: &TransitionContext,
    ) -> PhaseReport {
        let sources = workspace.handlers(phase);
        if sources.is_empty() {
            tracing::debug!(workspace = %workspace.id, %phase, "no handlers, skipped");
            return PhaseReport::skipped(workspace.id.clone(), phase);
        }

        let slots = self.slots(&workspace.id, phase, sources.len());
        let runs = sources.iter().zip(slots.iter()).enumerate().map(|(index, (source, slot))| {
            let ctx = transition.for_handler(workspace.id.clone(), phase);
            self.invoke_one(index, source, slot, ctx)
        });
        let handlers = join_all(runs).await;

        let report = PhaseReport {
            workspace: workspace.id.clone(),
            phase,
            handlers,
        };

        if report.is_degraded() {
            for failure in report.failures() {
                tracing::warn!(
                    workspace = %report.workspace,
                    %phase,
                    index = failure.index,
                    outcome = ?failure.outcome,
                    "lifecycle handler degraded"
                );
            }
        }

        report
    }

    async fn invoke_one(
        &self,
        index: usize,
        source: &HandlerSource,
        slot: &Slot,
        ctx: HandlerContext,
    ) -> HandlerReport {
        let started = Instant::now();
        let token = ctx.token().clone();

        let run = async {
            let handler = resolve(source, slot).await?;
            handler.handle(ctx).await
        };

        let settled = tokio::time::timeout(self.timeout, async {
            // Cancellation is checked first so a woken handler that merely
            // observed it is reported as cancelled. A handler that vetoes and
            // returns in the same poll still counts as succeeded.
            tokio::select! {
                biased;
                _ = token.cancelled() => None,
                result = run => Some(result),
            }
        })
        .await;

        let outcome = match settled {
            Ok(Some(Ok(()))) => HandlerOutcome::Succeeded,
            Ok(Some(Err(err))) => HandlerOutcome::Failed(err.to_string()),
            Ok(None) => HandlerOutcome::Cancelled,
            Err(_) => {
                token.cancel(CancelReason::TimedOut);
                HandlerOutcome::TimedOut
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        tracing::debug!(index, ?outcome, elapsed_ms, "handler settled");

        HandlerReport {
            index,
            outcome,
            elapsed_ms,
        }
    }

    /// Slots for a `(workspace, phase)` pair, created on first use
    fn slots(&self, id: &WorkspaceId, phase: Phase, len: usize) -> Arc<[Slot]> {
        let mut resolved = self.resolved.lock();
        let slots = resolved
            .entry((id.clone(), phase))
            .or_insert_with(|| (0..len).map(|_| OnceCell::new()).collect());
        Arc::clone(slots)
    }
}

impl std::fmt::Debug for HandlerInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerInvoker")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Ready handlers are returned as is; lazy ones are loaded once and cached.
/// A failed load leaves the slot empty so the next invocation retries.
async fn resolve(
    source: &HandlerSource,
    slot: &Slot,
) -> Result<Arc<dyn LifecycleHandler>, HandlerError> {
    match source {
        HandlerSource::Ready(handler) => Ok(Arc::clone(handler)),
        HandlerSource::Lazy(loader) => slot.get_or_try_init(|| loader.load()).await.cloned(),
    }
}
