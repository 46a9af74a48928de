//! DocumentService contract

use crate::Result;
use async_trait::async_trait;
use doclink_types::{Binding, BindingFields};

/// Abstract contract for the internal document service that persists
/// bindings.
///
/// Every mutation ships the full [`BindingFields`] set; the service never
/// receives partial patches. Failures surface as
/// [`Error::Network`](crate::Error::Network),
/// [`Error::BindingNotFound`](crate::Error::BindingNotFound), or
/// [`Error::Conflict`](crate::Error::Conflict).
#[async_trait]
pub trait DocumentService: Send + Sync {
    /// Persist a new binding under a document, returning it with its
    /// assigned id.
    async fn create_binding(&self, document_id: &str, fields: &BindingFields) -> Result<Binding>;

    /// Wholesale-replace a binding's coordinate set.
    async fn update_binding(
        &self,
        document_id: &str,
        binding_id: &str,
        fields: &BindingFields,
    ) -> Result<Binding>;

    /// Remove a persisted binding.
    async fn delete_binding(&self, document_id: &str, binding_id: &str) -> Result<()>;

    /// Load a binding by id.
    async fn get_binding(&self, document_id: &str, binding_id: &str) -> Result<Binding>;
}
