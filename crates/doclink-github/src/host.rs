//! SourceHost trait and wire types

use crate::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

/// Credential for the source-control host.
///
/// Supplied by the authentication collaborator; never read from ambient
/// state. `Debug` is redacted so tokens cannot leak into logs.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(..)")
    }
}

/// File payload as returned by the host: transport-encoded (base64) bytes.
#[derive(Debug, Clone, Deserialize)]
pub struct FileContent {
    pub content: String,
}

/// Branch tip as returned by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct BranchInfo {
    pub commit_id: String,
}

/// Abstract contract for the source-control host API.
///
/// Implementations own the HTTP transport. All calls are non-blocking and
/// fail with [`Error::NotFound`](crate::Error::NotFound),
/// [`Error::Network`](crate::Error::Network), or
/// [`Error::Unauthenticated`](crate::Error::Unauthenticated).
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Fetch the raw file payload at a specific commit.
    async fn file_at_commit(
        &self,
        token: &AccessToken,
        owner: &str,
        repo: &str,
        path: &str,
        commit_id: &str,
    ) -> Result<FileContent>;

    /// Fetch the current tip commit of a branch.
    async fn branch_head(
        &self,
        token: &AccessToken,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<BranchInfo>;
}
