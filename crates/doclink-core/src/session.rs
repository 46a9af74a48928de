//! Sync state machine for a mounted binding node

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use doclink_types::{Binding, SyncStatus};

use crate::Result;
use crate::context::SessionContext;
use crate::drift::DriftResult;
use crate::tree::NodeRef;

/// Observable sync state of one binding node.
///
/// Only `InSync` and `OutOfSync` ever persist (as
/// [`SyncStatus`]); the rest are display states for the current cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// A drift cycle is running
    Loading,
    /// Anchor range matches the branch head range
    InSync,
    /// The bound range has drifted at the branch head
    OutOfSync,
    /// Unable to determine sync status this cycle; retry available
    Errored,
    /// No host credential; prompts account linking rather than an error
    Unauthenticated,
}

impl SyncState {
    /// The persistable status, if this state carries a verdict.
    pub fn status(&self) -> Option<SyncStatus> {
        match self {
            Self::InSync => Some(SyncStatus::InSync),
            Self::OutOfSync => Some(SyncStatus::OutOfSync),
            Self::Loading | Self::Errored | Self::Unauthenticated => None,
        }
    }
}

/// Cycle token, state, and drift result share one lock: a commit validates
/// its token and writes its verdict under the same guard, so a stale cycle
/// can never pass the token check and then overwrite a newer commit.
struct CycleState {
    cycle: u64,
    state: SyncState,
    last_drift: Option<DriftResult>,
}

/// Sync lifecycle of a single binding node.
///
/// Drift cycles triggered by load and by refresh may race; a monotonically
/// increasing cycle token enforces latest-result-wins, and results arriving
/// after [`close`](Self::close) are discarded without touching state.
/// Mutating operators (rebind, sync-to-head, delete) are serialized through
/// an internal per-session lock.
pub struct BindingSession {
    pub(crate) ctx: SessionContext,
    pub(crate) document_id: String,
    pub(crate) node: NodeRef,
    pub(crate) binding: Mutex<Binding>,
    cycle: Mutex<CycleState>,
    closed: AtomicBool,
    pub(crate) op_lock: tokio::sync::Mutex<()>,
}

impl BindingSession {
    /// Load the binding from the document service and run the initial drift
    /// cycle.
    ///
    /// # Errors
    ///
    /// Fails only if the binding itself cannot be loaded; drift failures are
    /// absorbed into the [`SyncState::Errored`] display state.
    pub async fn open(
        ctx: SessionContext,
        document_id: impl Into<String>,
        binding_id: &str,
        node: NodeRef,
    ) -> Result<Self> {
        let document_id = document_id.into();
        let binding = ctx.documents.get_binding(&document_id, binding_id).await?;

        let session = Self {
            ctx,
            document_id,
            node,
            binding: Mutex::new(binding),
            cycle: Mutex::new(CycleState {
                cycle: 0,
                state: SyncState::Loading,
                last_drift: None,
            }),
            closed: AtomicBool::new(false),
            op_lock: tokio::sync::Mutex::new(()),
        };
        session.refresh().await;
        Ok(session)
    }

    /// Current in-memory copy of the binding.
    pub fn binding(&self) -> Binding {
        lock(&self.binding).clone()
    }

    pub fn state(&self) -> SyncState {
        lock(&self.cycle).state.clone()
    }

    /// Result of the last committed drift cycle, if any.
    pub fn last_drift(&self) -> Option<DriftResult> {
        lock(&self.cycle).last_drift.clone()
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn node(&self) -> &NodeRef {
        &self.node
    }

    /// Run one drift cycle against the current binding coordinates.
    ///
    /// Re-entrant from any state. Starting a new cycle supersedes any cycle
    /// still in flight: the older result is discarded on arrival.
    pub async fn refresh(&self) {
        let cycle = {
            let mut guard = lock(&self.cycle);
            guard.cycle += 1;
            guard.cycle
        };
        self.commit(cycle, SyncState::Loading, None);

        let Some(token) = self.ctx.auth.host_token() else {
            self.commit(cycle, SyncState::Unauthenticated, None);
            return;
        };

        let binding = self.binding();
        match self.ctx.detector.detect(&token, &binding).await {
            Ok(drift) => {
                let state = if drift.in_sync {
                    SyncState::InSync
                } else {
                    SyncState::OutOfSync
                };
                self.commit(cycle, state, Some(drift));
            }
            Err(error) => {
                tracing::warn!(binding_id = %binding.id, %error, "Drift check failed");
                self.commit(cycle, SyncState::Errored, None);
            }
        }
    }

    /// Tear down the session when the owning node leaves the tree. Any
    /// in-flight cycle result is discarded on arrival; nothing is mutated
    /// or notified afterwards.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Replace the in-memory binding wholesale and start a fresh cycle
    /// against the new coordinates.
    pub(crate) async fn install_binding(&self, binding: Binding) {
        *lock(&self.binding) = binding;
        self.refresh().await;
    }

    /// Commit a cycle result, unless the session closed or a newer cycle
    /// superseded this one. The token check and the state write happen under
    /// one guard; the listener is notified before the guard is released so
    /// the notification stream matches commit order.
    fn commit(&self, cycle: u64, state: SyncState, drift: Option<DriftResult>) {
        if self.closed.load(Ordering::SeqCst) {
            tracing::debug!(cycle, "Discarding result for torn-down binding node");
            return;
        }

        let mut guard = lock(&self.cycle);
        if guard.cycle != cycle {
            tracing::debug!(cycle, "Discarding superseded drift result");
            return;
        }

        if let Some(drift) = drift {
            guard.last_drift = Some(drift);
        }
        guard.state = state.clone();

        let binding_id = lock(&self.binding).id.clone();
        self.ctx.listener.status_changed(&binding_id, &state);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
