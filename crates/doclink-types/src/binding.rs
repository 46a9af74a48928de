//! Binding entity and its persisted layout

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Freshness of a binding relative to its branch head, as persisted by the
/// document service.
///
/// The wire encoding is an integer enum (`1 = InSync`, `2 = OutOfSync`);
/// transient display states (loading, errored, unauthenticated) are never
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SyncStatus {
    InSync = 1,
    OutOfSync = 2,
}

impl From<SyncStatus> for u8 {
    fn from(status: SyncStatus) -> Self {
        match status {
            SyncStatus::InSync => 1,
            SyncStatus::OutOfSync => 2,
        }
    }
}

impl TryFrom<u8> for SyncStatus {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::InSync),
            2 => Ok(Self::OutOfSync),
            other => Err(format!("invalid sync status code: {other}")),
        }
    }
}

/// Coordinates addressing a contiguous line range of a file at a commit.
///
/// Lines are inclusive and 1-indexed. `end_line: None` means "rest of file".
/// `start_line > end_line` is tolerated: the content fetcher falls back to
/// the full file rather than erroring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coordinates {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub path: String,
    /// The anchor commit: the commit the binding was last synced to.
    #[serde(rename = "commit_sha")]
    pub commit_id: String,
    pub start_line: u32,
    #[serde(default)]
    pub end_line: Option<u32>,
}

impl Coordinates {
    /// Same file on the same branch, re-anchored to a different commit.
    pub fn at_commit(&self, commit_id: impl Into<String>) -> Self {
        Self {
            commit_id: commit_id.into(),
            ..self.clone()
        }
    }
}

/// The wholesale coordinate set sent to the document service on create and
/// update. A binding is never patched field-by-field; every mutation ships
/// this full shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingFields {
    #[serde(flatten)]
    pub coordinates: Coordinates,
    /// Correlation id of the in-document highlight this binding is tied to.
    pub mark_id: String,
    pub status: SyncStatus,
}

impl BindingFields {
    /// True for the payload of a transient node that was created with no
    /// target. Such a node never migrates; it is a permanent no-op.
    pub fn is_empty(&self) -> bool {
        self.coordinates.owner.is_empty()
            && self.coordinates.repo.is_empty()
            && self.coordinates.path.is_empty()
    }
}

/// A pre-persistence binding candidate: the same shape as [`BindingFields`]
/// but not yet owned by any document. It exists only until the legacy
/// migration adapter converts it into a durable [`Binding`].
pub type TransientPayload = BindingFields;

/// Persisted descriptor of a document-to-file link.
///
/// Owned by the document service; the in-memory copy is replaced wholesale
/// after every successful operator call, never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub id: String,
    pub document_id: String,
    #[serde(flatten)]
    pub coordinates: Coordinates,
    pub mark_id: String,
    /// Last-computed freshness. Derived, not authoritative: recomputed by a
    /// drift cycle on every load.
    pub status: SyncStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    /// Login of the user who last changed the binding. Audit data owned by
    /// the document service, set on create and update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_by: Option<String>,
}

impl Binding {
    /// Project the binding back into the wholesale update payload.
    pub fn fields(&self) -> BindingFields {
        BindingFields {
            coordinates: self.coordinates.clone(),
            mark_id: self.mark_id.clone(),
            status: self.status,
        }
    }
}
