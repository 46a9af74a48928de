//! Error types for doclink-github

/// Result type for doclink-github operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the source-control host or
/// decoding its payloads
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File, commit, or branch absent on the host. Not retryable without
    /// changing coordinates.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Transport-level failure. Transient; retryable by user action.
    #[error("Network error: {0}")]
    Network(String),

    /// No valid host credential. Surfaced as a distinct "link your account"
    /// state by callers, not as a generic error.
    #[error("Not authenticated against the source-control host")]
    Unauthenticated,

    /// Payload was not valid base64
    #[error("Failed to decode file content: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded payload was not valid UTF-8
    #[error("File content is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl Error {
    /// Whether retrying the same request could succeed without any change
    /// on the user's side.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}
