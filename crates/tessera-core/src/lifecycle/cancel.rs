//! Cooperative cancellation for transitions
//!
//! Each transition owns one token shared by every handler in it. Handlers see
//! a child token that also fires on their own timeout, so a slow handler never
//! cancels its siblings.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Why a token was cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CancelReason {
    /// A newer transition request arrived
    Superseded,
    /// A handler or caller cancelled the transition
    Requested,
    /// The handler exceeded its time budget
    TimedOut,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::Superseded => write!(f, "superseded"),
            CancelReason::Requested => write!(f, "requested"),
            CancelReason::TimedOut => write!(f, "timed out"),
        }
    }
}

type State = Arc<watch::Sender<Option<CancelReason>>>;

/// Cloneable cancellation signal
///
/// The first `cancel` wins; later calls keep the original reason.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    own: State,
    parent: Option<State>,
}

impl CancellationToken {
    /// Create a root token
    pub fn new() -> Self {
        Self {
            own: Arc::new(watch::Sender::new(None)),
            parent: None,
        }
    }

    /// Create a token that is cancelled with this one, but can also be
    /// cancelled on its own without affecting this one
    pub fn child_token(&self) -> Self {
        Self {
            own: Arc::new(watch::Sender::new(None)),
            parent: Some(Arc::clone(&self.own)),
        }
    }

    /// Cancel the token; returns false if it was already cancelled
    pub fn cancel(&self, reason: CancelReason) -> bool {
        self.own.send_if_modified(|state| {
            if state.is_none() {
                *state = Some(reason);
                true
            } else {
                false
            }
        })
    }

    /// Checks if cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// Returns the reason for cancellation, own reason first
    pub fn reason(&self) -> Option<CancelReason> {
        let own = *self.own.borrow();
        own.or_else(|| self.parent.as_ref().and_then(|p| *p.borrow()))
    }

    /// Resolves once the token (or its parent) is cancelled
    pub async fn cancelled(&self) {
        let mut own = self.own.subscribe();
        match &self.parent {
            Some(parent) => {
                let mut parent = parent.subscribe();
                tokio::select! {
                    _ = own.wait_for(Option::is_some) => {}
                    _ = parent.wait_for(Option::is_some) => {}
                }
            }
            None => {
                let _ = own.wait_for(Option::is_some).await;
            }
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_reason_wins() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());

        assert!(token.cancel(CancelReason::Superseded));
        assert!(!token.cancel(CancelReason::Requested));
        assert_eq!(token.reason(), Some(CancelReason::Superseded));
    }

    #[test]
    fn test_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel(CancelReason::Requested);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_child_follows_parent_but_not_reverse() {
        let parent = CancellationToken::new();
        let child = parent.child_token();

        child.cancel(CancelReason::TimedOut);
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());

        let other = parent.child_token();
        parent.cancel(CancelReason::Superseded);
        assert_eq!(other.reason(), Some(CancelReason::Superseded));
        // own reason takes precedence
        assert_eq!(child.reason(), Some(CancelReason::TimedOut));
    }

    #[tokio::test]
    async fn test_cancelled_wakes_waiters() {
        let parent = CancellationToken::new();
        let child = parent.child_token();

        let waiter = tokio::spawn(async move {
            child.cancelled().await;
            child.reason()
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        parent.cancel(CancelReason::Requested);

        let reason = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reason, Some(CancelReason::Requested));
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel(CancelReason::Requested);
        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .unwrap();
    }
}
