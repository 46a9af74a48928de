//! Error types for doclink-core

/// Result type for doclink-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in doclink-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The document service has no binding with this id
    #[error("Binding not found: {id}")]
    BindingNotFound { id: String },

    /// The document service rejected a mutation due to stale state. The
    /// caller should re-fetch the binding and retry the operator call once.
    #[error("Conflict updating binding {id}: {reason}")]
    Conflict { id: String, reason: String },

    /// Transport failure talking to the document service
    #[error("Network error: {0}")]
    Network(String),

    /// The anchor commit's content could not be retrieved; there is nothing
    /// to compare a head fetch against
    #[error("Content unavailable at anchor commit {commit_id}")]
    ContentUnavailable {
        commit_id: String,
        #[source]
        source: doclink_github::Error,
    },

    /// Migration was invoked before the owning document existed
    #[error("Migration requires a document id")]
    MissingDocumentId,

    /// Source-control host error
    #[error(transparent)]
    Host(#[from] doclink_github::Error),
}
