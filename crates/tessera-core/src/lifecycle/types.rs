//! Lifecycle phases, triggers and report types
//!
//! Reports are serializable so UI bindings can surface diagnostics.

use crate::workspace::WorkspaceId;
use serde::{Deserialize, Serialize};

/// One of the four lifecycle moments of a workspace switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// Outgoing workspace, before the switch commits
    BeforeDeactivate,
    /// Outgoing workspace, after the switch committed
    AfterDeactivate,
    /// Incoming workspace, before the switch commits
    BeforeActivate,
    /// Incoming workspace, after the switch committed
    AfterActivate,
}

impl Phase {
    /// All phases in lifecycle order
    pub const ALL: [Phase; 4] = [
        Phase::BeforeDeactivate,
        Phase::BeforeActivate,
        Phase::AfterDeactivate,
        Phase::AfterActivate,
    ];

    /// Get the phase name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::BeforeDeactivate => "beforeDeactivate",
            Phase::AfterDeactivate => "afterDeactivate",
            Phase::BeforeActivate => "beforeActivate",
            Phase::AfterActivate => "afterActivate",
        }
    }

    /// Phases that run before the commit and can be cancelled
    pub fn is_pre_commit(&self) -> bool {
        matches!(self, Phase::BeforeDeactivate | Phase::BeforeActivate)
    }

    /// Phases that run on the outgoing workspace
    pub fn is_deactivation(&self) -> bool {
        matches!(self, Phase::BeforeDeactivate | Phase::AfterDeactivate)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused a transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    /// Route change
    Navigation,
    /// Explicit user or code action
    Programmatic,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trigger::Navigation => f.write_str("navigation"),
            Trigger::Programmatic => f.write_str("programmatic"),
        }
    }
}

impl std::str::FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "navigation" => Ok(Trigger::Navigation),
            "programmatic" => Ok(Trigger::Programmatic),
            other => Err(format!("unknown trigger: {}", other)),
        }
    }
}

/// Terminal state of one handler invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "kebab-case")]
pub enum HandlerOutcome {
    /// No handler registered for the phase
    Skipped,
    /// Handler completed normally
    Succeeded,
    /// Handler (or its loader) raised
    Failed(String),
    /// Handler exceeded the configured timeout
    TimedOut,
    /// Owning transition was cancelled or superseded while the handler ran
    Cancelled,
}

impl HandlerOutcome {
    /// Failed or timed out
    pub fn is_degraded(&self) -> bool {
        matches!(self, HandlerOutcome::Failed(_) | HandlerOutcome::TimedOut)
    }
}

/// Report for a single handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerReport {
    /// Position of the handler within its phase group
    pub index: usize,

    /// How the invocation ended
    pub outcome: HandlerOutcome,

    /// Wall time spent, in milliseconds
    pub elapsed_ms: u64,
}

/// Aggregated status of a phase group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    /// Nothing registered
    Skipped,
    /// Every handler succeeded (or was cancelled with the transition)
    Ok,
    /// At least one handler failed or timed out
    Degraded,
}

/// Report for one phase of one workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub workspace: WorkspaceId,
    pub phase: Phase,
    pub handlers: Vec<HandlerReport>,
}

impl PhaseReport {
    /// Report for a phase with no registered handlers
    pub fn skipped(workspace: WorkspaceId, phase: Phase) -> Self {
        Self {
            workspace,
            phase,
            handlers: Vec::new(),
        }
    }

    /// Aggregated status
    pub fn status(&self) -> PhaseStatus {
        if self.handlers.is_empty() {
            PhaseStatus::Skipped
        } else if self.is_degraded() {
            PhaseStatus::Degraded
        } else {
            PhaseStatus::Ok
        }
    }

    /// Whether any handler failed or timed out
    pub fn is_degraded(&self) -> bool {
        self.handlers.iter().any(|h| h.outcome.is_degraded())
    }

    /// Single outcome summarising the group
    ///
    /// `Skipped` when empty, otherwise the first non-successful outcome,
    /// otherwise `Succeeded`.
    pub fn outcome(&self) -> HandlerOutcome {
        if self.handlers.is_empty() {
            return HandlerOutcome::Skipped;
        }
        self.handlers
            .iter()
            .map(|h| &h.outcome)
            .find(|o| **o != HandlerOutcome::Succeeded)
            .cloned()
            .unwrap_or(HandlerOutcome::Succeeded)
    }

    /// Outcomes that failed or timed out
    pub fn failures(&self) -> impl Iterator<Item = &HandlerReport> {
        self.handlers.iter().filter(|h| h.outcome.is_degraded())
    }
}

/// Result of one transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionOutcome {
    /// The store now points at the target
    Committed,
    /// Target was already active; nothing ran
    NoOp,
    /// Cancellation arrived before commit
    Cancelled,
    /// A newer request pre-empted this one
    Superseded,
}

impl std::fmt::Display for TransitionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionOutcome::Committed => f.write_str("committed"),
            TransitionOutcome::NoOp => f.write_str("no-op"),
            TransitionOutcome::Cancelled => f.write_str("cancelled"),
            TransitionOutcome::Superseded => f.write_str("superseded"),
        }
    }
}

/// Serializable summary of a transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionReport {
    /// Sequence number allocated to the attempt (`None` for no-ops)
    pub sequence: Option<u64>,
    pub from: Option<WorkspaceId>,
    pub to: WorkspaceId,
    pub trigger: Trigger,
    pub outcome: TransitionOutcome,

    /// Pre-commit phase reports (and post-commit ones once collected)
    pub phases: Vec<PhaseReport>,
}

impl TransitionReport {
    /// Find the report for a phase
    pub fn phase(&self, phase: Phase) -> Option<&PhaseReport> {
        self.phases.iter().find(|p| p.phase == phase)
    }

    /// Whether any phase is degraded
    pub fn is_degraded(&self) -> bool {
        self.phases.iter().any(PhaseReport::is_degraded)
    }
}
