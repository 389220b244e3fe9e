//! Audit handler
//!
//! Logs every lifecycle phase a workspace goes through.

use async_trait::async_trait;
use tessera_core::{HandlerContext, HandlerError, LifecycleHandler};

/// Handler that records phase progress through tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct AuditHandler;

#[async_trait]
impl LifecycleHandler for AuditHandler {
    async fn handle(&self, ctx: HandlerContext) -> Result<(), HandlerError> {
        if ctx.is_cancelled() {
            tracing::debug!(
                workspace = %ctx.workspace(),
                phase = %ctx.phase(),
                "skipping audit, transition cancelled"
            );
            return Ok(());
        }
        tracing::info!(
            target: "tessera::audit",
            sequence = ctx.sequence(),
            trigger = %ctx.trigger(),
            "{}",
            audit_line(&ctx)
        );
        Ok(())
    }
}

/// One-line description of the phase a handler runs in
pub fn audit_line(ctx: &HandlerContext) -> String {
    let mut line = format!("{} {}", ctx.workspace(), ctx.phase());
    if let Some(next) = ctx.next() {
        line.push_str(&format!(" -> {}", next));
    }
    if let Some(previous) = ctx.previous() {
        line.push_str(&format!(" <- {}", previous));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tessera_core::{CancelReason, Phase, TransitionContext, Trigger, WorkspaceId};

    fn transition(from: Option<&str>) -> TransitionContext {
        TransitionContext::new(
            2,
            from.map(WorkspaceId::from),
            WorkspaceId::from("billing"),
            Trigger::Navigation,
            0,
        )
    }

    fn handler_context(from: Option<&str>, workspace: &str, phase: Phase) -> HandlerContext {
        transition(from).for_handler(WorkspaceId::from(workspace), phase)
    }

    #[test]
    fn test_audit_line_for_deactivation() {
        let ctx = handler_context(Some("home"), "home", Phase::BeforeDeactivate);
        assert_eq!(audit_line(&ctx), "home beforeDeactivate -> billing");
    }

    #[test]
    fn test_audit_line_for_activation() {
        let ctx = handler_context(Some("home"), "billing", Phase::AfterActivate);
        assert_eq!(audit_line(&ctx), "billing afterActivate <- home");

        let ctx = handler_context(None, "billing", Phase::BeforeActivate);
        assert_eq!(audit_line(&ctx), "billing beforeActivate");
    }

    #[tokio::test]
    async fn test_audit_handler_never_fails() {
        let transition = transition(None);
        let ctx = transition.for_handler(WorkspaceId::from("billing"), Phase::BeforeActivate);
        assert!(AuditHandler.handle(ctx).await.is_ok());

        transition.token().cancel(CancelReason::Requested);
        let ctx = transition.for_handler(WorkspaceId::from("billing"), Phase::BeforeActivate);
        assert!(AuditHandler.handle(ctx).await.is_ok());
    }
}
