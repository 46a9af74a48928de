//! Drift detection between a binding's anchor commit and its branch head

use similar::{ChangeTag, DiffTag, TextDiff};

use doclink_github::{AccessToken, ContentFetcher};
use doclink_types::Binding;

use crate::{Error, Result};

/// Verdict of one drift check, with both slices for the display diff.
/// Ephemeral: never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriftResult {
    /// Line range at the binding's anchor commit
    pub anchor_slice: String,
    /// Same line range at the branch head
    pub head_slice: String,
    /// The branch head commit the check ran against
    pub head_commit_id: String,
    /// True iff the word-level diff of the two slices has exactly one
    /// unchanged segment
    pub in_sync: bool,
}

impl DriftResult {
    /// Word-level changes between the two slices, for rendering a diff view.
    pub fn changes(&self) -> Vec<DriftChange> {
        word_changes(&self.anchor_slice, &self.head_slice)
    }
}

/// One segment of a word-level diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriftChange {
    Added(String),
    Removed(String),
    Unchanged(String),
}

/// Word-level diff segments between two texts, with consecutive tokens of
/// the same kind merged into one segment.
pub fn word_changes(old: &str, new: &str) -> Vec<DriftChange> {
    let diff = TextDiff::from_words(old, new);
    let mut changes: Vec<DriftChange> = Vec::new();

    for change in diff.iter_all_changes() {
        let text = change.value();
        match (change.tag(), changes.last_mut()) {
            (ChangeTag::Equal, Some(DriftChange::Unchanged(segment)))
            | (ChangeTag::Delete, Some(DriftChange::Removed(segment)))
            | (ChangeTag::Insert, Some(DriftChange::Added(segment))) => segment.push_str(text),
            (ChangeTag::Equal, _) => changes.push(DriftChange::Unchanged(text.to_string())),
            (ChangeTag::Delete, _) => changes.push(DriftChange::Removed(text.to_string())),
            (ChangeTag::Insert, _) => changes.push(DriftChange::Added(text.to_string())),
        }
    }

    changes
}

/// Equality expressed through the diff primitive: the texts are in sync iff
/// every diff op is an unchanged segment. Whitespace, comment, and
/// trailing-newline differences all count as drift.
fn slices_in_sync(anchor: &str, head: &str) -> bool {
    TextDiff::from_words(anchor, head)
        .ops()
        .iter()
        .all(|op| op.tag() == DiffTag::Equal)
}

/// Compares content at a binding's anchor commit against its branch head.
///
/// Stateless: committing the verdict to a state machine is the caller's
/// responsibility.
#[derive(Clone)]
pub struct DriftDetector {
    fetcher: ContentFetcher,
}

impl DriftDetector {
    pub fn new(fetcher: ContentFetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &ContentFetcher {
        &self.fetcher
    }

    /// Run one drift check for a binding.
    ///
    /// The anchor fetch and the branch-head lookup are issued concurrently.
    /// When the head equals the anchor commit the check short-circuits to
    /// in-sync without a second content fetch.
    ///
    /// # Errors
    ///
    /// `ContentUnavailable` if the anchor range cannot be retrieved (the
    /// head is not consulted in that case); host errors otherwise.
    pub async fn detect(&self, token: &AccessToken, binding: &Binding) -> Result<DriftResult> {
        let coordinates = &binding.coordinates;

        let (anchor, head) = tokio::join!(
            self.fetcher.fetch_range(token, coordinates),
            self.fetcher.branch_head(
                token,
                &coordinates.owner,
                &coordinates.repo,
                &coordinates.branch,
            ),
        );

        let anchor = anchor.map_err(|source| Error::ContentUnavailable {
            commit_id: coordinates.commit_id.clone(),
            source,
        })?;
        let head_commit_id = head?;

        if head_commit_id == coordinates.commit_id {
            tracing::debug!(
                binding_id = %binding.id,
                commit_id = %head_commit_id,
                "Anchor is at branch head; skipping head fetch"
            );
            return Ok(DriftResult {
                anchor_slice: anchor.slice.clone(),
                head_slice: anchor.slice,
                head_commit_id,
                in_sync: true,
            });
        }

        let head_content = self
            .fetcher
            .fetch_range_at(token, coordinates, &head_commit_id)
            .await?;

        let in_sync = slices_in_sync(&anchor.slice, &head_content.slice);
        tracing::debug!(
            binding_id = %binding.id,
            anchor = %coordinates.commit_id,
            head = %head_commit_id,
            in_sync,
            "Drift check complete"
        );

        Ok(DriftResult {
            anchor_slice: anchor.slice,
            head_slice: head_content.slice,
            head_commit_id,
            in_sync,
        })
    }
}
