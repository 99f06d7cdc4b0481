use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("quota exceeded in {namespace:?}")]
    QuotaExceeded { namespace: Namespace },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Storage areas with independent quotas. Bulk data (response caches) must go
/// in `Local`; `Sync` is reserved for small user settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Local,
    Sync,
}

/// Async key-value store collaborator (browser storage in production,
/// in-memory in tests). Values are JSON.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<Value>, StorageError>;

    async fn set(&self, namespace: Namespace, key: &str, value: Value) -> Result<(), StorageError>;

    async fn remove(&self, namespace: Namespace, key: &str) -> Result<(), StorageError>;

    /// Keys starting with `prefix`, for namespace-wide purges.
    async fn keys_with_prefix(
        &self,
        namespace: Namespace,
        prefix: &str,
    ) -> Result<Vec<String>, StorageError>;
}

/// In-memory store used by tests and the demo binary.
#[derive(Default)]
pub struct MemoryStore {
    local: DashMap<String, Value>,
    sync: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, namespace: Namespace) -> &DashMap<String, Value> {
        match namespace {
            Namespace::Local => &self.local,
            Namespace::Sync => &self.sync,
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, namespace: Namespace, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.map(namespace).get(key).map(|v| v.clone()))
    }

    async fn set(&self, namespace: Namespace, key: &str, value: Value) -> Result<(), StorageError> {
        self.map(namespace).insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, namespace: Namespace, key: &str) -> Result<(), StorageError> {
        self.map(namespace).remove(key);
        Ok(())
    }

    async fn keys_with_prefix(
        &self,
        namespace: Namespace,
        prefix: &str,
    ) -> Result<Vec<String>, StorageError> {
        Ok(self
            .map(namespace)
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let store = MemoryStore::new();
        store
            .set(Namespace::Local, "k", json!({"a": 1}))
            .await
            .unwrap();
        assert!(store.get(Namespace::Sync, "k").await.unwrap().is_none());
        assert_eq!(
            store.get(Namespace::Local, "k").await.unwrap(),
            Some(json!({"a": 1}))
        );
    }

    #[tokio::test]
    async fn test_prefix_listing() {
        let store = MemoryStore::new();
        store
            .set(Namespace::Local, "cache/a", json!(1))
            .await
            .unwrap();
        store
            .set(Namespace::Local, "cache/b", json!(2))
            .await
            .unwrap();
        store
            .set(Namespace::Local, "other", json!(3))
            .await
            .unwrap();

        let mut keys = store
            .keys_with_prefix(Namespace::Local, "cache/")
            .await
            .unwrap();
        keys.sort();
        assert_eq!(keys, vec!["cache/a", "cache/b"]);
    }
}
