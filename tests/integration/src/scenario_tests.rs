//! End-to-end scenarios through the full binding lifecycle:
//! migrate a legacy payload, open a session, observe drift, review the
//! diff, sync to head, and unlink.

use std::sync::Arc;

use doclink_core::{
    BindingSession, DriftDetector, Migrator, NodeRef, SessionContext, SyncState,
};
use doclink_github::ContentFetcher;
use doclink_test_utils::{
    FakeDocumentService, FakeSourceHost, FakeTree, RecordingListener, StaticAuth,
    sample_coordinates, sample_fields,
};
use doclink_types::{Binding, SyncStatus};
use pretty_assertions::assert_eq;

struct World {
    host: Arc<FakeSourceHost>,
    documents: Arc<FakeDocumentService>,
    tree: Arc<FakeTree>,
    listener: Arc<RecordingListener>,
}

impl World {
    fn new() -> Self {
        Self {
            host: Arc::new(FakeSourceHost::new()),
            documents: Arc::new(FakeDocumentService::new()),
            tree: Arc::new(FakeTree::new()),
            listener: Arc::new(RecordingListener::new()),
        }
    }

    fn context(&self) -> SessionContext {
        SessionContext::new(
            DriftDetector::new(ContentFetcher::new(self.host.clone())),
            self.documents.clone(),
            self.tree.clone(),
            Arc::new(StaticAuth::token("t")),
        )
        .with_listener(self.listener.clone())
    }

    fn put_main_file(&self, commit_id: &str, text: &str) {
        self.host
            .put_file("octocat", "hello-world", "src/lib.rs", commit_id, text);
    }

    fn set_head(&self, commit_id: &str) {
        self.host
            .set_branch_head("octocat", "hello-world", "main", commit_id);
    }
}

/// A file whose lines 1..=9 are filler and lines 10..=12 are the given
/// three lines.
fn file_with_window(l10: &str, l11: &str, l12: &str) -> String {
    let mut lines: Vec<String> = (1..=9).map(|i| format!("filler{i}")).collect();
    lines.push(l10.to_string());
    lines.push(l11.to_string());
    lines.push(l12.to_string());
    lines.join("\n")
}

#[tokio::test]
async fn scenario_drift_in_bound_window() {
    // Anchor c1 has lines 10-12 = a/b/c; head c2 has a/b/C. The detector
    // must flag drift and hand back both slices for the diff view.
    let world = World::new();
    world.put_main_file("c1", &file_with_window("a", "b", "c"));
    world.put_main_file("c2", &file_with_window("a", "b", "C"));
    world.set_head("c2");
    world.documents.insert(Binding {
        id: "b-1".to_string(),
        document_id: "d-1".to_string(),
        coordinates: sample_coordinates("c1", 10, Some(12)),
        mark_id: "mark-1".to_string(),
        status: SyncStatus::InSync,
        modified: None,
        last_updated_by: None,
    });

    let session = BindingSession::open(world.context(), "d-1", "b-1", NodeRef::new("n-1"))
        .await
        .unwrap();

    assert_eq!(session.state(), SyncState::OutOfSync);
    let drift = session.last_drift().unwrap();
    assert!(!drift.in_sync);
    assert_eq!(drift.anchor_slice, "a\nb\nc");
    assert_eq!(drift.head_slice, "a\nb\nC");
    assert_eq!(drift.head_commit_id, "c2");
}

#[tokio::test]
async fn scenario_inverted_range_falls_back_to_full_file() {
    // start_line=5, end_line=3 against a 20-line file: all 20 lines come
    // back unsliced, and the check is not an error.
    let world = World::new();
    let text: String = (1..=20)
        .map(|i| format!("line{i}"))
        .collect::<Vec<_>>()
        .join("\n");
    world.put_main_file("c1", &text);
    world.set_head("c1");
    world.documents.insert(Binding {
        id: "b-1".to_string(),
        document_id: "d-1".to_string(),
        coordinates: sample_coordinates("c1", 5, Some(3)),
        mark_id: "mark-1".to_string(),
        status: SyncStatus::InSync,
        modified: None,
        last_updated_by: None,
    });

    let session = BindingSession::open(world.context(), "d-1", "b-1", NodeRef::new("n-1"))
        .await
        .unwrap();

    assert_eq!(session.state(), SyncState::InSync);
    let drift = session.last_drift().unwrap();
    assert_eq!(drift.anchor_slice, text);
    assert_eq!(drift.anchor_slice.lines().count(), 20);
}

#[tokio::test]
async fn scenario_sync_to_head_reconciles_drift() {
    let world = World::new();
    world.put_main_file("c1", &file_with_window("a", "b", "c"));
    world.put_main_file("c2", &file_with_window("a", "b", "C"));
    world.set_head("c2");
    world.documents.insert(Binding {
        id: "b-1".to_string(),
        document_id: "d-1".to_string(),
        coordinates: sample_coordinates("c1", 10, Some(12)),
        mark_id: "mark-1".to_string(),
        status: SyncStatus::InSync,
        modified: None,
        last_updated_by: None,
    });

    let session = BindingSession::open(world.context(), "d-1", "b-1", NodeRef::new("n-1"))
        .await
        .unwrap();
    assert_eq!(session.state(), SyncState::OutOfSync);

    let updated = session.sync_to_head().await.unwrap();

    // The new anchor is the head that was current just before the call,
    // and the follow-up cycle sees identical content
    assert_eq!(updated.coordinates.commit_id, "c2");
    assert_eq!(session.state(), SyncState::InSync);
    assert!(session.last_drift().unwrap().in_sync);
    assert_eq!(session.last_drift().unwrap().head_slice, "a\nb\nC");

    // The document service holds the rebased binding
    let persisted = world.documents.binding("b-1").unwrap();
    assert_eq!(persisted.coordinates.commit_id, "c2");
    assert_eq!(persisted.coordinates.start_line, 10);
    assert_eq!(persisted.coordinates.end_line, Some(12));
}

#[tokio::test]
async fn scenario_legacy_payload_becomes_live_binding() {
    // A transient, document-less payload migrates into a durable binding
    // once the document exists, and the new binding loads like any other.
    let world = World::new();
    world.put_main_file("c1", &file_with_window("a", "b", "c"));
    world.set_head("c1");

    let transient_node = NodeRef::new("legacy-node");
    world.tree.add_node(transient_node.clone());

    let migrator = Migrator::new(world.documents.clone(), world.tree.clone());
    let binding = migrator
        .migrate("d-1", &sample_fields("c1", 10, Some(12)), &transient_node)
        .await
        .unwrap()
        .expect("payload should migrate");

    assert!(!world.tree.contains_node(&transient_node));
    let binding_nodes = world.tree.binding_nodes();
    assert_eq!(binding_nodes.len(), 1);
    assert_eq!(binding_nodes[0].1, "d-1");
    assert_eq!(binding_nodes[0].2, binding.id);

    // A second mount must not migrate again
    let again = migrator
        .migrate("d-1", &sample_fields("c1", 10, Some(12)), &transient_node)
        .await
        .unwrap();
    assert!(again.is_none());
    assert_eq!(world.documents.binding_count(), 1);

    // The migrated binding behaves like a freshly linked one
    let session = BindingSession::open(
        world.context(),
        "d-1",
        &binding.id,
        binding_nodes[0].0.clone(),
    )
    .await
    .unwrap();
    assert_eq!(session.state(), SyncState::InSync);
    assert_eq!(session.last_drift().unwrap().anchor_slice, "a\nb\nc");
}

#[tokio::test]
async fn scenario_unlink_removes_binding_and_node() {
    let world = World::new();
    world.put_main_file("c1", &file_with_window("a", "b", "c"));
    world.set_head("c1");
    let node = NodeRef::new("n-1");
    world.tree.add_node(node.clone());
    world.documents.insert(Binding {
        id: "b-1".to_string(),
        document_id: "d-1".to_string(),
        coordinates: sample_coordinates("c1", 10, Some(12)),
        mark_id: "mark-1".to_string(),
        status: SyncStatus::InSync,
        modified: None,
        last_updated_by: None,
    });

    let session = BindingSession::open(world.context(), "d-1", "b-1", node.clone())
        .await
        .unwrap();
    session.delete().await.unwrap();

    assert_eq!(world.documents.binding_count(), 0);
    assert!(!world.tree.contains_node(&node));
    assert!(session.is_closed());
}

#[tokio::test]
async fn scenario_persisted_layout_round_trips_through_service_shape() {
    // The serialized form is what the document service stores: flat
    // coordinates, commit_sha naming, and integer status codes.
    let binding = Binding {
        id: "b-1".to_string(),
        document_id: "d-1".to_string(),
        coordinates: sample_coordinates("c1", 10, Some(12)),
        mark_id: "mark-1".to_string(),
        status: SyncStatus::OutOfSync,
        modified: None,
        last_updated_by: None,
    };

    let value = serde_json::to_value(&binding).unwrap();
    assert_eq!(value["owner"], "octocat");
    assert_eq!(value["commit_sha"], "c1");
    assert_eq!(value["start_line"], 10);
    assert_eq!(value["end_line"], 12);
    assert_eq!(value["mark_id"], "mark-1");
    assert_eq!(value["status"], 2);
    assert_eq!(value["document_id"], "d-1");

    let back: Binding = serde_json::from_value(value).unwrap();
    assert_eq!(back, binding);
}
