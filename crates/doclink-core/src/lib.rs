//! Core binding lifecycle for doclink
//!
//! Owns the hard part of a live code binding: detecting when the bound
//! range has drifted from its branch head, keeping the observable sync
//! state consistent under racing refreshes, and reconciling drift (or
//! migrating a legacy binding) without ever leaving the document in a
//! half-updated state.
//!
//! The document tree, persistence service, host transport, and
//! authentication are external collaborators behind traits; everything
//! here is independent of their object models.

pub mod context;
pub mod document;
pub mod drift;
pub mod error;
pub mod migrate;
pub mod rebind;
pub mod session;
pub mod tree;

pub use context::{AuthProvider, NoopListener, SessionContext, StatusListener};
pub use document::DocumentService;
pub use drift::{DriftChange, DriftDetector, DriftResult, word_changes};
pub use error::{Error, Result};
pub use migrate::Migrator;
pub use session::{BindingSession, SyncState};
pub use tree::{DocumentTree, NodeRef, TreeEdit};
