//! Typed session storage on top of a key-value backend.

use crate::backend::KvBackend;
use purgatory_types::{History, SessionId, StoreError};
use std::sync::Arc;

/// Raw value persisted for a reserved session with no attempts yet.
const PLACEHOLDER: &str = "";

/// What a store read found for an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoredValue {
    NotFound,
    Placeholder,
    History(History),
}

/// Maps identifiers to serialized histories. Last writer wins.
#[derive(Clone)]
pub struct SessionStore {
    backend: Arc<dyn KvBackend>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl SessionStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    /// Store the placeholder for `id`. Calling twice overwrites.
    pub async fn reserve(&self, id: &SessionId) -> Result<(), StoreError> {
        tracing::debug!("Reserving session {id} in {} store", self.backend.name());
        self.backend
            .put(id.as_str(), PLACEHOLDER.to_string())
            .await
    }

    /// Read and decode the entry for `id`.
    pub async fn get(&self, id: &SessionId) -> Result<StoredValue, StoreError> {
        let raw = self.backend.get(id.as_str()).await?;
        match raw.as_deref() {
            None => Ok(StoredValue::NotFound),
            Some(PLACEHOLDER) => Ok(StoredValue::Placeholder),
            Some(data) => serde_json::from_str::<History>(data)
                .map(StoredValue::History)
                .map_err(|source| StoreError::Corrupt {
                    key: id.to_string(),
                    source,
                }),
        }
    }

    /// Serialize `history` and overwrite the entry for `id`.
    pub async fn put(&self, id: &SessionId, history: &History) -> Result<(), StoreError> {
        let json = serde_json::to_string(history)?;
        tracing::debug!(
            "Writing {} attempt(s) for session {id} to {} store",
            history.len(),
            self.backend.name()
        );
        self.backend.put(id.as_str(), json).await
    }
}
