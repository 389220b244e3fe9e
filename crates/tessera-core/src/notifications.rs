//! Notifications that the lifecycle core sends to UI bindings
//!
//! They are serializable so any front end can forward them as-is.

use crate::lifecycle::{PhaseReport, TransitionReport};
use crate::workspace::WorkspaceId;
use crossbeam_channel::{Sender, TrySendError};
use serde::{Deserialize, Serialize};

/// Notifications emitted by the lifecycle service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notification {
    /// A transition committed and the workspace is now active
    WorkspaceActivated {
        /// The newly active workspace
        workspace: WorkspaceId,

        /// Committed sequence number
        sequence: u64,
    },

    /// A transition request finished (any outcome)
    TransitionSettled {
        /// Summary of the attempt, pre-commit phases only
        report: TransitionReport,
    },

    /// A phase had failing or timed-out handlers
    PhaseDegraded {
        /// Sequence of the owning transition
        sequence: u64,

        /// The degraded phase
        report: PhaseReport,
    },

    /// Warning message
    Warning {
        /// Warning text
        message: String,
    },
}

impl Notification {
    /// Create a WorkspaceActivated notification
    pub fn workspace_activated(workspace: WorkspaceId, sequence: u64) -> Self {
        Notification::WorkspaceActivated {
            workspace,
            sequence,
        }
    }

    /// Create a TransitionSettled notification
    pub fn transition_settled(report: TransitionReport) -> Self {
        Notification::TransitionSettled { report }
    }

    /// Create a PhaseDegraded notification
    pub fn phase_degraded(sequence: u64, report: PhaseReport) -> Self {
        Notification::PhaseDegraded { sequence, report }
    }

    /// Create a Warning notification
    pub fn warning(message: impl Into<String>) -> Self {
        Notification::Warning {
            message: message.into(),
        }
    }
}

/// Non-blocking notification sender
///
/// Drops notifications when the channel is full or nobody listens; the
/// lifecycle never waits on a slow UI.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: Option<Sender<Notification>>,
}

impl Notifier {
    pub fn new(tx: Sender<Notification>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A notifier that discards everything
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn send(&self, notification: Notification) {
        let Some(tx) = &self.tx else {
            return;
        };
        match tx.try_send(notification) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(?dropped, "notification channel full, dropping");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::trace!("notification receiver gone");
            }
        }
    }
}
