//! Collaborator wiring for binding sessions

use std::sync::Arc;

use doclink_github::AccessToken;

use crate::document::DocumentService;
use crate::drift::DriftDetector;
use crate::session::SyncState;
use crate::tree::DocumentTree;

/// Supplies the current source-control host credential.
///
/// Absence of a token is a terminal display state (link-your-account), not
/// an error to retry; the session never polls for one.
pub trait AuthProvider: Send + Sync {
    fn host_token(&self) -> Option<AccessToken>;
}

/// Receives committed state changes, keyed by binding id.
///
/// Called only for results that survived the latest-wins check; stale or
/// torn-down cycles never reach the listener. Invoked synchronously while
/// the session is mid-commit: implementations must record and return, not
/// call back into the session.
pub trait StatusListener: Send + Sync {
    fn status_changed(&self, binding_id: &str, state: &SyncState);
}

/// Listener for callers that do not observe status changes.
pub struct NoopListener;

impl StatusListener for NoopListener {
    fn status_changed(&self, _binding_id: &str, _state: &SyncState) {}
}

/// Bundle of external collaborators a binding session operates against.
///
/// Everything is passed explicitly; the core never reads ambient document
/// or authentication state.
#[derive(Clone)]
pub struct SessionContext {
    pub detector: DriftDetector,
    pub documents: Arc<dyn DocumentService>,
    pub tree: Arc<dyn DocumentTree>,
    pub auth: Arc<dyn AuthProvider>,
    pub listener: Arc<dyn StatusListener>,
}

impl SessionContext {
    pub fn new(
        detector: DriftDetector,
        documents: Arc<dyn DocumentService>,
        tree: Arc<dyn DocumentTree>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            detector,
            documents,
            tree,
            auth,
            listener: Arc::new(NoopListener),
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn StatusListener>) -> Self {
        self.listener = listener;
        self
    }
}
