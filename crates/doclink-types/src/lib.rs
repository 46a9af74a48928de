//! Shared types for doclink
//!
//! Defines the binding entity: the persisted descriptor linking a document
//! node to a line range of a file at a specific commit in a source-control
//! host.

pub mod binding;

pub use binding::{Binding, BindingFields, Coordinates, SyncStatus, TransientPayload};
