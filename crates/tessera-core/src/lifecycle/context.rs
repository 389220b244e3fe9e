//! Transition and handler contexts

use super::cancel::{CancelReason, CancellationToken};
use super::types::{Phase, Trigger};
use crate::workspace::WorkspaceId;
use std::sync::Arc;

/// Current time in Unix epoch milliseconds
pub(crate) fn now_millis() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

#[derive(Debug)]
struct TransitionRecord {
    sequence: u64,
    from: Option<WorkspaceId>,
    to: WorkspaceId,
    trigger: Trigger,
    timestamp: i64,
    token: CancellationToken,
}

/// Shared record of one transition attempt
///
/// Created once per attempt; every handler of the attempt sees the same
/// record and the same cancellation token.
#[derive(Debug, Clone)]
pub struct TransitionContext {
    inner: Arc<TransitionRecord>,
}

impl TransitionContext {
    /// Create a context with a fresh cancellation token
    pub fn new(
        sequence: u64,
        from: Option<WorkspaceId>,
        to: WorkspaceId,
        trigger: Trigger,
        timestamp: i64,
    ) -> Self {
        Self::with_token(sequence, from, to, trigger, timestamp, CancellationToken::new())
    }

    /// Create a context around an existing token
    pub fn with_token(
        sequence: u64,
        from: Option<WorkspaceId>,
        to: WorkspaceId,
        trigger: Trigger,
        timestamp: i64,
        token: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(TransitionRecord {
                sequence,
                from,
                to,
                trigger,
                timestamp,
                token,
            }),
        }
    }

    pub fn sequence(&self) -> u64 {
        self.inner.sequence
    }

    /// Workspace being left, absent at startup
    pub fn from(&self) -> Option<&WorkspaceId> {
        self.inner.from.as_ref()
    }

    /// Workspace being entered
    pub fn to(&self) -> &WorkspaceId {
        &self.inner.to
    }

    pub fn trigger(&self) -> Trigger {
        self.inner.trigger
    }

    /// Request time in Unix epoch milliseconds
    pub fn timestamp(&self) -> i64 {
        self.inner.timestamp
    }

    /// The transition-wide token
    pub fn token(&self) -> &CancellationToken {
        &self.inner.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Bind the transition to one handler of one workspace and phase
    pub fn for_handler(&self, workspace: WorkspaceId, phase: Phase) -> HandlerContext {
        HandlerContext {
            transition: self.clone(),
            workspace,
            phase,
            token: self.inner.token.child_token(),
        }
    }
}

/// What a lifecycle handler receives
#[derive(Debug, Clone)]
pub struct HandlerContext {
    transition: TransitionContext,
    workspace: WorkspaceId,
    phase: Phase,
    token: CancellationToken,
}

impl HandlerContext {
    /// Workspace the handler belongs to
    pub fn workspace(&self) -> &WorkspaceId {
        &self.workspace
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Workspace being left; set for activate-phase handlers
    pub fn previous(&self) -> Option<&WorkspaceId> {
        if self.phase.is_deactivation() {
            None
        } else {
            self.transition.from()
        }
    }

    /// Workspace being entered; set for deactivate-phase handlers
    pub fn next(&self) -> Option<&WorkspaceId> {
        if self.phase.is_deactivation() {
            Some(self.transition.to())
        } else {
            None
        }
    }

    pub fn trigger(&self) -> Trigger {
        self.transition.trigger()
    }

    pub fn timestamp(&self) -> i64 {
        self.transition.timestamp()
    }

    pub fn sequence(&self) -> u64 {
        self.transition.sequence()
    }

    pub fn transition(&self) -> &TransitionContext {
        &self.transition
    }

    /// Token observed by this handler
    ///
    /// Fires when the transition is superseded or cancelled, or when this
    /// handler times out.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once this handler should stop
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Veto the transition
    ///
    /// Only pre-commit handlers can veto; returns false after commit or when
    /// the transition was already cancelled.
    pub fn cancel_transition(&self) -> bool {
        if !self.phase.is_pre_commit() {
            return false;
        }
        self.transition.token().cancel(CancelReason::Requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> TransitionContext {
        TransitionContext::new(
            7,
            Some(WorkspaceId::from("a")),
            WorkspaceId::from("b"),
            Trigger::Navigation,
            1_700_000_000_000,
        )
    }

    #[test]
    fn test_deactivate_handler_sees_next() {
        let ctx = context().for_handler(WorkspaceId::from("a"), Phase::BeforeDeactivate);
        assert_eq!(ctx.workspace().as_str(), "a");
        assert_eq!(ctx.next().map(|id| id.as_str()), Some("b"));
        assert!(ctx.previous().is_none());
        assert_eq!(ctx.sequence(), 7);
    }

    #[test]
    fn test_activate_handler_sees_previous() {
        let ctx = context().for_handler(WorkspaceId::from("b"), Phase::AfterActivate);
        assert_eq!(ctx.previous().map(|id| id.as_str()), Some("a"));
        assert!(ctx.next().is_none());
        assert_eq!(ctx.trigger(), Trigger::Navigation);
    }

    #[test]
    fn test_cancel_transition_reaches_siblings() {
        let transition = context();
        let first = transition.for_handler(WorkspaceId::from("a"), Phase::BeforeDeactivate);
        let second = transition.for_handler(WorkspaceId::from("b"), Phase::BeforeActivate);

        assert!(first.cancel_transition());
        assert!(second.is_cancelled());
        assert!(transition.is_cancelled());
        assert_eq!(transition.token().reason(), Some(CancelReason::Requested));
    }

    #[test]
    fn test_post_commit_handler_cannot_veto() {
        let transition = context();
        let ctx = transition.for_handler(WorkspaceId::from("b"), Phase::AfterActivate);
        assert!(!ctx.cancel_transition());
        assert!(!transition.is_cancelled());
    }

    #[test]
    fn test_handler_token_is_private() {
        let transition = context();
        let ctx = transition.for_handler(WorkspaceId::from("b"), Phase::BeforeActivate);
        ctx.token().cancel(CancelReason::TimedOut);
        assert!(ctx.is_cancelled());
        assert!(!transition.is_cancelled());
    }
}
