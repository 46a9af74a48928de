//! Rebind/update operators
//!
//! A binding is never patched field-by-field: every mutation sends the full
//! coordinate set to the document service and, on success, replaces the
//! in-memory binding wholesale before re-running drift detection against
//! the new coordinates. On failure the previous binding and its last known
//! state are untouched.

use doclink_types::{Binding, BindingFields};

use crate::Result;
use crate::session::BindingSession;
use crate::tree::TreeEdit;

impl BindingSession {
    /// Atomically replace the binding's coordinates.
    ///
    /// Triggers a fresh drift cycle on success. A rebind to the branch head
    /// normally lands in sync, but the detector still runs: callers may
    /// rebind to an arbitrary commit or range.
    ///
    /// # Errors
    ///
    /// `Network`, `BindingNotFound`, or `Conflict` from the document
    /// service; in every failure case no state change is applied.
    pub async fn rebind(&self, fields: BindingFields) -> Result<Binding> {
        let _guard = self.op_lock.lock().await;
        self.rebind_locked(fields).await
    }

    /// Rebind keeping owner/repo/branch/path and line range fixed, moving
    /// the anchor commit to the branch's current head.
    ///
    /// Holds the operator lock across the head lookup and the rebind, so no
    /// other operator call can interleave between them.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` if no host credential is available, `NotFound` if
    /// the branch is gone, plus everything [`rebind`](Self::rebind) can
    /// fail with.
    pub async fn sync_to_head(&self) -> Result<Binding> {
        let _guard = self.op_lock.lock().await;

        let token = self
            .ctx
            .auth
            .host_token()
            .ok_or(doclink_github::Error::Unauthenticated)?;

        let binding = self.binding();
        let coordinates = &binding.coordinates;
        let head = self
            .ctx
            .detector
            .fetcher()
            .branch_head(
                &token,
                &coordinates.owner,
                &coordinates.repo,
                &coordinates.branch,
            )
            .await?;

        let mut fields = binding.fields();
        fields.coordinates = coordinates.at_commit(head);
        self.rebind_locked(fields).await
    }

    /// The rebind body; callers must hold `op_lock`.
    async fn rebind_locked(&self, fields: BindingFields) -> Result<Binding> {
        let binding_id = self.binding().id;
        let updated = self
            .ctx
            .documents
            .update_binding(&self.document_id, &binding_id, &fields)
            .await?;

        tracing::info!(
            binding_id = %updated.id,
            commit_id = %updated.coordinates.commit_id,
            "Rebound binding"
        );
        self.install_binding(updated.clone()).await;
        Ok(updated)
    }

    /// Unlink the binding: delete it from the document service, then remove
    /// the in-tree node in a single tree transaction, then close the
    /// session.
    pub async fn delete(&self) -> Result<()> {
        let _guard = self.op_lock.lock().await;

        let binding = self.binding();
        self.ctx
            .documents
            .delete_binding(&self.document_id, &binding.id)
            .await?;
        self.ctx
            .tree
            .apply(vec![TreeEdit::RemoveNode {
                node: self.node.clone(),
            }])
            .await?;

        tracing::info!(binding_id = %binding.id, "Unlinked binding");
        self.close();
        Ok(())
    }
}
