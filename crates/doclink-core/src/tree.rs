//! Document tree contract
//!
//! The rich-document runtime owns the node tree; the core only ever asks it
//! to apply structural edits inside a single transaction.

use crate::Result;
use async_trait::async_trait;

/// Opaque handle to a node in the owning document tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef(String);

impl NodeRef {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

/// A structural edit applied to the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEdit {
    /// Remove a node from the tree.
    RemoveNode { node: NodeRef },
    /// Insert a durable binding node at another node's prior position,
    /// replaying the normal insert-binding command so the new node is
    /// indistinguishable from a freshly linked one.
    InsertBindingNode {
        at: NodeRef,
        document_id: String,
        binding_id: String,
    },
}

/// Abstract contract for the tree runtime's transaction boundary.
#[async_trait]
pub trait DocumentTree: Send + Sync {
    /// Apply all edits within one transaction: either every edit takes
    /// effect or none does. There is never an observable intermediate state.
    async fn apply(&self, edits: Vec<TreeEdit>) -> Result<()>;

    /// Whether the node is still present in the tree.
    async fn contains(&self, node: &NodeRef) -> bool;
}
