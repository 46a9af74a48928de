//! In-memory document service

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use doclink_core::{DocumentService, Error, Result};
use doclink_types::{Binding, BindingFields};

/// Failure injected into the next matching service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceFailure {
    Network,
    NotFound,
    Conflict,
}

impl ServiceFailure {
    fn into_error(self, binding_id: &str) -> Error {
        match self {
            Self::Network => Error::Network("injected network failure".to_string()),
            Self::NotFound => Error::BindingNotFound {
                id: binding_id.to_string(),
            },
            Self::Conflict => Error::Conflict {
                id: binding_id.to_string(),
                reason: "stale binding id".to_string(),
            },
        }
    }
}

#[derive(Default)]
struct ServiceState {
    bindings: HashMap<String, Binding>,
    fail_next_create: Option<ServiceFailure>,
    fail_next_update: Option<ServiceFailure>,
    update_calls: usize,
}

/// In-memory [`DocumentService`] with injectable failures.
#[derive(Default)]
pub struct FakeDocumentService {
    state: Mutex<ServiceState>,
}

impl FakeDocumentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a binding directly, bypassing create.
    pub fn insert(&self, binding: Binding) {
        self.lock().bindings.insert(binding.id.clone(), binding);
    }

    pub fn binding(&self, binding_id: &str) -> Option<Binding> {
        self.lock().bindings.get(binding_id).cloned()
    }

    pub fn binding_count(&self) -> usize {
        self.lock().bindings.len()
    }

    pub fn update_calls(&self) -> usize {
        self.lock().update_calls
    }

    pub fn fail_next_create(&self, failure: ServiceFailure) {
        self.lock().fail_next_create = Some(failure);
    }

    pub fn fail_next_update(&self, failure: ServiceFailure) {
        self.lock().fail_next_update = Some(failure);
    }

    fn lock(&self) -> MutexGuard<'_, ServiceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentService for FakeDocumentService {
    async fn create_binding(&self, document_id: &str, fields: &BindingFields) -> Result<Binding> {
        let mut state = self.lock();
        if let Some(failure) = state.fail_next_create.take() {
            return Err(failure.into_error(""));
        }

        let binding = Binding {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.to_string(),
            coordinates: fields.coordinates.clone(),
            mark_id: fields.mark_id.clone(),
            status: fields.status,
            modified: Some(Utc::now()),
            last_updated_by: Some("octocat".to_string()),
        };
        state.bindings.insert(binding.id.clone(), binding.clone());
        Ok(binding)
    }

    async fn update_binding(
        &self,
        document_id: &str,
        binding_id: &str,
        fields: &BindingFields,
    ) -> Result<Binding> {
        let mut state = self.lock();
        state.update_calls += 1;
        if let Some(failure) = state.fail_next_update.take() {
            return Err(failure.into_error(binding_id));
        }

        let Some(existing) = state.bindings.get(binding_id) else {
            return Err(Error::BindingNotFound {
                id: binding_id.to_string(),
            });
        };
        if existing.document_id != document_id {
            return Err(Error::BindingNotFound {
                id: binding_id.to_string(),
            });
        }

        let updated = Binding {
            id: binding_id.to_string(),
            document_id: document_id.to_string(),
            coordinates: fields.coordinates.clone(),
            mark_id: fields.mark_id.clone(),
            status: fields.status,
            modified: Some(Utc::now()),
            last_updated_by: Some("octocat".to_string()),
        };
        state.bindings.insert(binding_id.to_string(), updated.clone());
        Ok(updated)
    }

    async fn delete_binding(&self, document_id: &str, binding_id: &str) -> Result<()> {
        let mut state = self.lock();
        match state.bindings.get(binding_id) {
            Some(existing) if existing.document_id == document_id => {
                state.bindings.remove(binding_id);
                Ok(())
            }
            _ => Err(Error::BindingNotFound {
                id: binding_id.to_string(),
            }),
        }
    }

    async fn get_binding(&self, document_id: &str, binding_id: &str) -> Result<Binding> {
        let state = self.lock();
        match state.bindings.get(binding_id) {
            Some(existing) if existing.document_id == document_id => Ok(existing.clone()),
            _ => Err(Error::BindingNotFound {
                id: binding_id.to_string(),
            }),
        }
    }
}
