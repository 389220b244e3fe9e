//! Transition controller
//!
//! Drives one workspace switch through its phases:
//!
//! ```text
//! request ──► beforeDeactivate(outgoing) ─┐
//!         └─► beforeActivate(incoming)  ──┴─► gate ─► commit ─► afterDeactivate ┐
//!                                              │                 afterActivate  ┘ (spawned)
//!                                              └─► cancelled / superseded
//! ```
//!
//! Request bookkeeping, the commit gate and the store write all happen under
//! the same lock, so a superseded transition can never commit after a newer
//! request has been accepted. Store subscribers run after that lock is
//! released, so they may call back into the controller.

use super::cancel::{CancelReason, CancellationToken};
use super::context::{now_millis, TransitionContext};
use super::invoker::HandlerInvoker;
use super::types::{Phase, PhaseReport, Trigger, TransitionOutcome, TransitionReport};
use crate::error::Result;
use crate::notifications::{Notification, Notifier};
use crate::store::ActiveWorkspaceStore;
use crate::workspace::{Workspace, WorkspaceId, WorkspaceRegistry};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug)]
struct PendingTransition {
    sequence: u64,
    token: CancellationToken,
}

#[derive(Debug, Default)]
struct Sequencer {
    /// Last sequence number handed out
    last_issued: u64,

    /// Transition currently in its pre-commit phases
    pending: Option<PendingTransition>,
}

/// Post-commit handlers still running in the background
#[derive(Debug)]
pub struct PostCommit {
    sequence: u64,
    handle: JoinHandle<Vec<PhaseReport>>,
}

impl PostCommit {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the post-commit phases to settle
    pub async fn wait(self) -> Vec<PhaseReport> {
        match self.handle.await {
            Ok(phases) => phases,
            Err(err) => {
                tracing::warn!(sequence = self.sequence, error = %err, "post-commit task failed");
                Vec::new()
            }
        }
    }
}

/// Result of [`TransitionController::request_transition`]
#[derive(Debug)]
pub struct Transition {
    /// Outcome and pre-commit phase reports
    pub report: TransitionReport,

    post_commit: Option<PostCommit>,
}

impl Transition {
    pub fn outcome(&self) -> TransitionOutcome {
        self.report.outcome
    }

    /// Take the background post-commit handle, if the transition committed
    pub fn take_post_commit(&mut self) -> Option<PostCommit> {
        self.post_commit.take()
    }

    /// Wait for post-commit handlers and return the complete report
    pub async fn settle(mut self) -> TransitionReport {
        if let Some(post_commit) = self.post_commit.take() {
            let phases = post_commit.wait().await;
            self.report.phases.extend(phases);
        }
        self.report
    }
}

/// Serializes workspace transitions and runs their lifecycle phases
pub struct TransitionController {
    registry: Arc<WorkspaceRegistry>,
    store: Arc<ActiveWorkspaceStore>,
    invoker: Arc<HandlerInvoker>,
    notifier: Notifier,
    sequencer: Mutex<Sequencer>,
}

impl TransitionController {
    pub fn new(
        registry: Arc<WorkspaceRegistry>,
        store: Arc<ActiveWorkspaceStore>,
        invoker: Arc<HandlerInvoker>,
        notifier: Notifier,
    ) -> Self {
        Self {
            registry,
            store,
            invoker,
            notifier,
            sequencer: Mutex::new(Sequencer::default()),
        }
    }

    pub fn registry(&self) -> &Arc<WorkspaceRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<ActiveWorkspaceStore> {
        &self.store
    }

    /// Sequence of the transition currently before its commit, if any
    pub fn pending_sequence(&self) -> Option<u64> {
        self.sequencer.lock().pending.as_ref().map(|p| p.sequence)
    }

    /// Cancel the transition currently before its commit
    ///
    /// Returns false when nothing is pending or it was already cancelled.
    pub fn cancel_pending(&self) -> bool {
        match &self.sequencer.lock().pending {
            Some(pending) => pending.token.cancel(CancelReason::Requested),
            None => false,
        }
    }

    /// Switch the active workspace to `target`
    ///
    /// Fails only when `target` is not registered. Handler failures are
    /// reported in the returned transition and never abort it.
    pub async fn request_transition(&self, target: &str, trigger: Trigger) -> Result<Transition> {
        let incoming = self.registry.get(target)?;

        let (context, outgoing) = {
            let mut sequencer = self.sequencer.lock();
            let current = self.store.current();

            if current.as_ref() == Some(&incoming.id) {
                if let Some(pending) = sequencer.pending.take() {
                    pending.token.cancel(CancelReason::Superseded);
                    tracing::info!(
                        superseded = pending.sequence,
                        workspace = %incoming.id,
                        "pending transition superseded by request for active workspace"
                    );
                }
                tracing::debug!(workspace = %incoming.id, "already active");
                let report = TransitionReport {
                    sequence: None,
                    from: current,
                    to: incoming.id.clone(),
                    trigger,
                    outcome: TransitionOutcome::NoOp,
                    phases: Vec::new(),
                };
                self.notifier
                    .send(Notification::transition_settled(report.clone()));
                return Ok(Transition {
                    report,
                    post_commit: None,
                });
            }

            sequencer.last_issued += 1;
            let sequence = sequencer.last_issued;
            let token = CancellationToken::new();

            let previous = sequencer.pending.replace(PendingTransition {
                sequence,
                token: token.clone(),
            });
            if let Some(previous) = previous {
                previous.token.cancel(CancelReason::Superseded);
                tracing::info!(
                    superseded = previous.sequence,
                    by = sequence,
                    "pending transition superseded"
                );
            }

            let outgoing = current
                .as_ref()
                .and_then(|id| self.registry.get(id.as_str()).ok());
            let context = TransitionContext::with_token(
                sequence,
                current,
                incoming.id.clone(),
                trigger,
                now_millis(),
                token,
            );
            (context, outgoing)
        };

        let sequence = context.sequence();
        tracing::info!(
            sequence,
            from = ?context.from().map(WorkspaceId::as_str),
            to = %incoming.id,
            %trigger,
            "transition started"
        );

        let phases = run_phases(
            &self.invoker,
            outgoing.as_deref(),
            &incoming,
            Phase::BeforeDeactivate,
            Phase::BeforeActivate,
            &context,
        )
        .await;
        self.report_degraded(sequence, &phases);

        let outcome = self.commit_gate(&incoming.id, &context);

        let post_commit = match outcome {
            TransitionOutcome::Committed => {
                tracing::info!(sequence, workspace = %incoming.id, "transition committed");
                self.store.notify_subscribers(&incoming.id, sequence);
                self.notifier.send(Notification::workspace_activated(
                    incoming.id.clone(),
                    sequence,
                ));
                Some(self.spawn_post_commit(outgoing, incoming.clone(), context.clone()))
            }
            other => {
                tracing::info!(
                    sequence,
                    workspace = %incoming.id,
                    outcome = %other,
                    "transition not committed"
                );
                None
            }
        };

        let report = TransitionReport {
            sequence: Some(sequence),
            from: context.from().cloned(),
            to: incoming.id.clone(),
            trigger,
            outcome,
            phases,
        };
        self.notifier
            .send(Notification::transition_settled(report.clone()));

        Ok(Transition {
            report,
            post_commit,
        })
    }

    /// Decide the outcome and commit if allowed, atomically with respect to
    /// new requests
    ///
    /// Subscribers are not run here; the caller notifies them after the
    /// sequencer lock is released.
    fn commit_gate(&self, target: &WorkspaceId, context: &TransitionContext) -> TransitionOutcome {
        let sequence = context.sequence();
        let mut sequencer = self.sequencer.lock();
        let latest = sequencer.last_issued == sequence;

        let outcome = match context.token().reason() {
            Some(CancelReason::Superseded) => TransitionOutcome::Superseded,
            _ if !latest => TransitionOutcome::Superseded,
            Some(_) => TransitionOutcome::Cancelled,
            None => {
                if self.store.commit(target.clone(), now_millis(), sequence) {
                    TransitionOutcome::Committed
                } else {
                    self.notifier.send(Notification::warning(format!(
                        "commit of {} rejected: sequence {} is stale",
                        target, sequence
                    )));
                    TransitionOutcome::Superseded
                }
            }
        };

        if sequencer.pending.as_ref().map(|p| p.sequence) == Some(sequence) {
            sequencer.pending = None;
        }
        outcome
    }

    fn spawn_post_commit(
        &self,
        outgoing: Option<Arc<Workspace>>,
        incoming: Arc<Workspace>,
        context: TransitionContext,
    ) -> PostCommit {
        let invoker = Arc::clone(&self.invoker);
        let notifier = self.notifier.clone();
        let sequence = context.sequence();

        let handle = tokio::spawn(async move {
            let phases = run_phases(
                &invoker,
                outgoing.as_deref(),
                &incoming,
                Phase::AfterDeactivate,
                Phase::AfterActivate,
                &context,
            )
            .await;
            for phase in phases.iter().filter(|p| p.is_degraded()) {
                notifier.send(Notification::phase_degraded(sequence, phase.clone()));
            }
            tracing::debug!(sequence, "post-commit phases settled");
            phases
        });

        PostCommit { sequence, handle }
    }

    fn report_degraded(&self, sequence: u64, phases: &[PhaseReport]) {
        for phase in phases.iter().filter(|p| p.is_degraded()) {
            self.notifier
                .send(Notification::phase_degraded(sequence, phase.clone()));
        }
    }
}

impl std::fmt::Debug for TransitionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionController")
            .field("store", &self.store)
            .field("sequencer", &*self.sequencer.lock())
            .finish_non_exhaustive()
    }
}

/// Run the outgoing and incoming phase groups concurrently
async fn run_phases(
    invoker: &HandlerInvoker,
    outgoing: Option<&Workspace>,
    incoming: &Workspace,
    deactivate: Phase,
    activate: Phase,
    context: &TransitionContext,
) -> Vec<PhaseReport> {
    let deactivating = async {
        match outgoing {
            Some(ws) => Some(invoker.invoke(ws, deactivate, context).await),
            None => None,
        }
    };
    let activating = invoker.invoke(incoming, activate, context);

    let (deactivated, activated) = futures::join!(deactivating, activating);
    deactivated.into_iter().chain(Some(activated)).collect()
}
