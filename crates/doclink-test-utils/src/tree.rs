//! In-memory document tree

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use doclink_core::{DocumentTree, Error, NodeRef, Result, TreeEdit};

#[derive(Default)]
struct TreeState {
    nodes: HashSet<NodeRef>,
    /// (node, document_id, binding_id) for every inserted binding node
    binding_nodes: Vec<(NodeRef, String, String)>,
    transactions: Vec<Vec<TreeEdit>>,
    fail_next_apply: bool,
}

/// In-memory [`DocumentTree`] that applies edits atomically and records
/// every transaction.
#[derive(Default)]
pub struct FakeTree {
    state: Mutex<TreeState>,
}

impl FakeTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&self, node: NodeRef) {
        self.lock().nodes.insert(node);
    }

    pub fn contains_node(&self, node: &NodeRef) -> bool {
        self.lock().nodes.contains(node)
    }

    pub fn node_count(&self) -> usize {
        self.lock().nodes.len()
    }

    /// Every binding node ever inserted, in insertion order.
    pub fn binding_nodes(&self) -> Vec<(NodeRef, String, String)> {
        self.lock().binding_nodes.clone()
    }

    /// Every applied transaction, in order.
    pub fn transactions(&self) -> Vec<Vec<TreeEdit>> {
        self.lock().transactions.clone()
    }

    pub fn fail_next_apply(&self) {
        self.lock().fail_next_apply = true;
    }

    fn lock(&self) -> MutexGuard<'_, TreeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentTree for FakeTree {
    async fn apply(&self, edits: Vec<TreeEdit>) -> Result<()> {
        let mut state = self.lock();
        if state.fail_next_apply {
            state.fail_next_apply = false;
            return Err(Error::Network("injected tree failure".to_string()));
        }

        // All-or-nothing: edits land together or not at all
        for edit in &edits {
            match edit {
                TreeEdit::RemoveNode { node } => {
                    state.nodes.remove(node);
                }
                TreeEdit::InsertBindingNode {
                    at,
                    document_id,
                    binding_id,
                } => {
                    let node = NodeRef::new(format!("binding:{binding_id}@{}", at.key()));
                    state.nodes.insert(node.clone());
                    state
                        .binding_nodes
                        .push((node, document_id.clone(), binding_id.clone()));
                }
            }
        }
        state.transactions.push(edits);
        Ok(())
    }

    async fn contains(&self, node: &NodeRef) -> bool {
        self.lock().nodes.contains(node)
    }
}
