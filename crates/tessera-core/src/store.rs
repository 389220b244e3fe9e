//! Active workspace store
//!
//! Holds the one piece of shared mutable state: which workspace is active.
//! Only the transition controller writes it; UI bindings read it or subscribe.

use crate::workspace::WorkspaceId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Snapshot of the active workspace
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWorkspaceState {
    /// Currently active workspace, absent before the first commit
    pub current: Option<WorkspaceId>,

    /// Activation timestamp (Unix epoch milliseconds)
    pub activated_at: Option<i64>,

    /// Sequence number of the last committed transition
    pub sequence: u64,
}

/// Handle returned by [`ActiveWorkspaceStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Arc<dyn Fn(&WorkspaceId) + Send + Sync>;

/// Process-wide active workspace state
#[derive(Default)]
pub struct ActiveWorkspaceStore {
    state: RwLock<ActiveWorkspaceState>,
    subscribers: RwLock<Vec<(SubscriptionId, Subscriber)>>,
    next_subscription: AtomicU64,
}

impl ActiveWorkspaceStore {
    /// Create a store with no active workspace
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently active workspace
    pub fn current(&self) -> Option<WorkspaceId> {
        self.state.read().current.clone()
    }

    /// Sequence of the last commit (0 before any commit)
    pub fn sequence(&self) -> u64 {
        self.state.read().sequence
    }

    pub fn snapshot(&self) -> ActiveWorkspaceState {
        self.state.read().clone()
    }

    /// Record a committed transition
    ///
    /// Rejected unless `sequence` is strictly greater than the stored one.
    /// Only writes the state; subscribers run in [`notify_subscribers`].
    ///
    /// [`notify_subscribers`]: Self::notify_subscribers
    pub(crate) fn commit(&self, id: WorkspaceId, timestamp: i64, sequence: u64) -> bool {
        let mut state = self.state.write();
        if sequence <= state.sequence {
            tracing::warn!(
                workspace = %id,
                sequence,
                stored = state.sequence,
                "rejected stale commit"
            );
            return false;
        }
        state.current = Some(id);
        state.activated_at = Some(timestamp);
        state.sequence = sequence;
        true
    }

    /// Run subscribers for the commit with `sequence`
    ///
    /// Must be called without holding any controller lock. Skipped when a
    /// newer commit already landed.
    pub(crate) fn notify_subscribers(&self, id: &WorkspaceId, sequence: u64) {
        if self.sequence() != sequence {
            tracing::debug!(workspace = %id, sequence, "skipping subscribers for stale commit");
            return;
        }

        let subscribers: Vec<Subscriber> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        for callback in subscribers {
            callback(id);
        }
    }

    /// Call `callback` with the new workspace id after every commit
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&WorkspaceId) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, Arc::new(callback)));
        id
    }

    /// Remove a subscriber; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sub, _)| *sub != id);
        subscribers.len() != before
    }
}

impl std::fmt::Debug for ActiveWorkspaceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveWorkspaceStore")
            .field("state", &*self.state.read())
            .field("subscribers", &self.subscribers.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_starts_empty() {
        let store = ActiveWorkspaceStore::new();
        assert!(store.current().is_none());
        assert_eq!(store.sequence(), 0);
        assert_eq!(store.snapshot(), ActiveWorkspaceState::default());
    }

    #[test]
    fn test_commit_updates_state() {
        let store = ActiveWorkspaceStore::new();
        assert!(store.commit(WorkspaceId::from("a"), 100, 1));

        let state = store.snapshot();
        assert_eq!(state.current, Some(WorkspaceId::from("a")));
        assert_eq!(state.activated_at, Some(100));
        assert_eq!(state.sequence, 1);
    }

    #[test]
    fn test_rejects_non_increasing_sequence() {
        let store = ActiveWorkspaceStore::new();
        assert!(store.commit(WorkspaceId::from("a"), 100, 3));
        assert!(!store.commit(WorkspaceId::from("b"), 200, 3));
        assert!(!store.commit(WorkspaceId::from("c"), 300, 2));

        assert_eq!(store.current(), Some(WorkspaceId::from("a")));
        assert_eq!(store.sequence(), 3);
    }

    fn commit_and_notify(store: &ActiveWorkspaceStore, id: &str, timestamp: i64, sequence: u64) {
        if store.commit(WorkspaceId::from(id), timestamp, sequence) {
            store.notify_subscribers(&WorkspaceId::from(id), sequence);
        }
    }

    #[test]
    fn test_subscribers_notified_on_commit_only() {
        let store = ActiveWorkspaceStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let sub = store.subscribe(move |id| sink.lock().push(id.to_string()));

        commit_and_notify(&store, "a", 1, 1);
        commit_and_notify(&store, "b", 2, 1);
        commit_and_notify(&store, "c", 3, 2);

        assert_eq!(*seen.lock(), vec!["a".to_string(), "c".to_string()]);

        assert!(store.unsubscribe(sub));
        assert!(!store.unsubscribe(sub));
        commit_and_notify(&store, "d", 4, 3);
        assert_eq!(seen.lock().len(), 2);
    }

    #[test]
    fn test_subscriber_can_read_store() {
        let store = Arc::new(ActiveWorkspaceStore::new());
        let reader = Arc::clone(&store);
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        store.subscribe(move |_| *sink.lock() = Some(reader.sequence()));

        commit_and_notify(&store, "a", 1, 5);
        assert_eq!(*seen.lock(), Some(5));
    }

    #[test]
    fn test_commit_does_not_run_subscribers() {
        let store = ActiveWorkspaceStore::new();
        let calls = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&calls);
        store.subscribe(move |_| *sink.lock() += 1);

        assert!(store.commit(WorkspaceId::from("a"), 1, 1));
        assert_eq!(*calls.lock(), 0);

        store.notify_subscribers(&WorkspaceId::from("a"), 1);
        assert_eq!(*calls.lock(), 1);
    }

    #[test]
    fn test_stale_notify_is_skipped() {
        let store = ActiveWorkspaceStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |id| sink.lock().push(id.to_string()));

        store.commit(WorkspaceId::from("a"), 1, 1);
        store.commit(WorkspaceId::from("b"), 2, 2);
        store.notify_subscribers(&WorkspaceId::from("a"), 1);
        store.notify_subscribers(&WorkspaceId::from("b"), 2);

        assert_eq!(*seen.lock(), vec!["b".to_string()]);
    }
}
