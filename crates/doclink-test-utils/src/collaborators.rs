//! Auth and status-listener stand-ins

use std::sync::{Mutex, PoisonError};

use doclink_core::{AuthProvider, StatusListener, SyncState};
use doclink_github::AccessToken;

/// [`AuthProvider`] with a fixed answer.
pub struct StaticAuth {
    token: Option<AccessToken>,
}

impl StaticAuth {
    pub fn token(secret: &str) -> Self {
        Self {
            token: Some(AccessToken::new(secret)),
        }
    }

    pub fn unauthenticated() -> Self {
        Self { token: None }
    }
}

impl AuthProvider for StaticAuth {
    fn host_token(&self) -> Option<AccessToken> {
        self.token.clone()
    }
}

/// [`StatusListener`] that records the committed state stream.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<(String, SyncState)>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(String, SyncState)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// States committed for one binding, in order.
    pub fn states_for(&self, binding_id: &str) -> Vec<SyncState> {
        self.events()
            .into_iter()
            .filter(|(id, _)| id == binding_id)
            .map(|(_, state)| state)
            .collect()
    }
}

impl StatusListener for RecordingListener {
    fn status_changed(&self, binding_id: &str, state: &SyncState) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((binding_id.to_string(), state.clone()));
    }
}
