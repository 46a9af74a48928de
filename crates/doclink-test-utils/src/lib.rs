//! Shared test fixtures for the doclink workspace.
//!
//! In-memory stand-ins for the external collaborators: the source-control
//! host, the document service, the tree runtime, and the auth/status
//! collaborators. Dev-dependency only, never published.

pub mod collaborators;
pub mod document;
pub mod host;
pub mod tree;

pub use collaborators::{RecordingListener, StaticAuth};
pub use document::{FakeDocumentService, ServiceFailure};
pub use host::FakeSourceHost;
pub use tree::FakeTree;

use doclink_types::{BindingFields, Coordinates, SyncStatus};

/// Coordinates for the fixture file used across test suites.
pub fn sample_coordinates(commit_id: &str, start_line: u32, end_line: Option<u32>) -> Coordinates {
    Coordinates {
        owner: "octocat".to_string(),
        repo: "hello-world".to_string(),
        branch: "main".to_string(),
        path: "src/lib.rs".to_string(),
        commit_id: commit_id.to_string(),
        start_line,
        end_line,
    }
}

/// A full create/update payload around [`sample_coordinates`].
pub fn sample_fields(commit_id: &str, start_line: u32, end_line: Option<u32>) -> BindingFields {
    BindingFields {
        coordinates: sample_coordinates(commit_id, start_line, end_line),
        mark_id: "mark-1".to_string(),
        status: SyncStatus::InSync,
    }
}
