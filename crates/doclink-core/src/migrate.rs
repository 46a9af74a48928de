//! Legacy binding migration
//!
//! Bindings created before their document existed live as transient,
//! document-id-less payloads on a placeholder tree node. Once a document id
//! becomes available the adapter persists a durable binding and swaps the
//! placeholder for a real binding node in one tree transaction.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use doclink_types::{Binding, TransientPayload};

use crate::document::DocumentService;
use crate::tree::{DocumentTree, NodeRef, TreeEdit};
use crate::{Error, Result};

/// Converts transient binding payloads into durable bindings.
pub struct Migrator {
    documents: Arc<dyn DocumentService>,
    tree: Arc<dyn DocumentTree>,
    in_flight: Mutex<HashSet<NodeRef>>,
}

impl Migrator {
    pub fn new(documents: Arc<dyn DocumentService>, tree: Arc<dyn DocumentTree>) -> Self {
        Self {
            documents,
            tree,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Migrate one transient node into a durable binding.
    ///
    /// Returns `Ok(None)` without side effects when there is nothing to do:
    /// the payload is empty (a permanent no-op node), the node has already
    /// left the tree (it was migrated on an earlier mount), or a migration
    /// for the same node is already in flight.
    ///
    /// On success the transient node is removed and a durable binding node
    /// is inserted at its prior position within a single tree transaction.
    /// On failure the transient node is left in place so nothing is lost
    /// and the user can retry.
    ///
    /// # Errors
    ///
    /// `MissingDocumentId` if called with an empty document id; document
    /// service and tree errors otherwise.
    pub async fn migrate(
        &self,
        document_id: &str,
        payload: &TransientPayload,
        node: &NodeRef,
    ) -> Result<Option<Binding>> {
        if document_id.is_empty() {
            return Err(Error::MissingDocumentId);
        }
        if payload.is_empty() {
            tracing::debug!(node = node.key(), "Transient node has no payload; skipping");
            return Ok(None);
        }
        if !self.tree.contains(node).await {
            tracing::debug!(node = node.key(), "Transient node already replaced");
            return Ok(None);
        }

        if !self.claim(node) {
            return Ok(None);
        }
        let result = self.run(document_id, payload, node).await;
        self.release(node);

        result.map(Some)
    }

    async fn run(
        &self,
        document_id: &str,
        payload: &TransientPayload,
        node: &NodeRef,
    ) -> Result<Binding> {
        let binding = self.documents.create_binding(document_id, payload).await?;

        // Remove the transient node and insert the durable one at its prior
        // position in one transaction; there is no observable state with
        // only one of them present.
        self.tree
            .apply(vec![
                TreeEdit::RemoveNode { node: node.clone() },
                TreeEdit::InsertBindingNode {
                    at: node.clone(),
                    document_id: document_id.to_string(),
                    binding_id: binding.id.clone(),
                },
            ])
            .await?;

        tracing::info!(
            node = node.key(),
            binding_id = %binding.id,
            "Migrated transient binding"
        );
        Ok(binding)
    }

    fn claim(&self, node: &NodeRef) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(node.clone())
    }

    fn release(&self, node: &NodeRef) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(node);
    }
}
