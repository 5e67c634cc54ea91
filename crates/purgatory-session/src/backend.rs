//! Key-value backend trait and the in-memory implementation.

use purgatory_types::StoreError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Boxed future returned by backend operations.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// A single-key get/put store holding raw string values.
///
/// No cross-key transactions and no compare-and-swap: `put` overwrites
/// unconditionally. Dyn-compatible so the store works with `Arc<dyn KvBackend>`.
pub trait KvBackend: Send + Sync {
    /// Fetch the raw value for `key`, or `None` if there is no entry.
    fn get<'a>(&'a self, key: &'a str) -> BackendFuture<'a, Option<String>>;

    /// Overwrite the entry for `key`.
    fn put<'a>(&'a self, key: &'a str, value: String) -> BackendFuture<'a, ()>;

    /// Backend name for logging (e.g., "memory").
    fn name(&self) -> &str;
}

/// Process-local backend. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl KvBackend for MemoryBackend {
    fn get<'a>(&'a self, key: &'a str) -> BackendFuture<'a, Option<String>> {
        Box::pin(async move { Ok(self.entries.read().await.get(key).cloned()) })
    }

    fn put<'a>(&'a self, key: &'a str, value: String) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            self.entries.write().await.insert(key.to_string(), value);
            Ok(())
        })
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_is_dyn_compatible() {
        // Compile-time check: KvBackend can be used as a trait object.
        fn _accept(_b: &dyn KvBackend) {}
        fn _assert_send_sync<T: Send + Sync>() {}
        _assert_send_sync::<Arc<dyn KvBackend>>();
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_overwrites() {
        let backend = MemoryBackend::new();
        backend.put("k", "one".into()).await.unwrap();
        backend.put("k", "two".into()).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("two"));
        assert_eq!(backend.len().await, 1);
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let backend = MemoryBackend::new();
        let other = backend.clone();
        backend.put("k", String::new()).await.unwrap();
        assert_eq!(other.get("k").await.unwrap().as_deref(), Some(""));
        assert!(!other.is_empty().await);
    }
}
