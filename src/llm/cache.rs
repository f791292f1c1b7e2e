//! Bounded memoized cache of loaded model handles
//!
//! Loading a local model handle validates files on disk and touches the
//! runtime, so handles are reused across requests. The cache holds the
//! active model plus one previous (capacity 2), evicting the least
//! recently used. There is no invalidation path: replacing a model file
//! under a running server means restarting it.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;

/// Identity of a loaded local model
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelKey {
    pub model_path: String,
    pub adapter_path: Option<String>,
    pub device: String,
}

/// Default number of cached model handles
pub const DEFAULT_MODEL_CACHE_SIZE: usize = 2;

/// A small keyed LRU. Entries are ordered oldest-first; a hit moves the
/// entry to the back, an insert at capacity drops the front.
pub struct ModelCache<V> {
    capacity: usize,
    entries: Mutex<Vec<(ModelKey, Arc<V>)>>,
}

impl<V> ModelCache<V> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Return the cached handle for `key`, loading it on a miss.
    ///
    /// The lock is held across the load, so concurrent requests for the
    /// same key load once and share the result.
    pub async fn get_or_load<F, Fut>(&self, key: &ModelKey, load: F) -> crate::Result<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::Result<V>>,
    {
        let mut entries = self.entries.lock().await;

        if let Some(pos) = entries.iter().position(|(k, _)| k == key) {
            let entry = entries.remove(pos);
            let value = entry.1.clone();
            entries.push(entry);
            return Ok(value);
        }

        let value = Arc::new(load().await?);
        if entries.len() >= self.capacity {
            let (evicted, _) = entries.remove(0);
            tracing::info!("Evicting cached model: {}", evicted.model_path);
        }
        entries.push((key.clone(), value.clone()));
        Ok(value)
    }

    /// Number of cached handles
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    use super::*;

    fn key(path: &str) -> ModelKey {
        ModelKey {
            model_path: path.to_string(),
            adapter_path: None,
            device: "auto".to_string(),
        }
    }

    #[tokio::test]
    async fn test_loads_once_per_key() {
        let cache: ModelCache<String> = ModelCache::new(2);
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_load(&key("/models/a.gguf"), || async {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok("a".to_string())
                })
                .await
                .unwrap();
            assert_eq!(*value, "a");
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    async fn load_counted(loads: &AtomicUsize, name: &str) -> crate::Result<String> {
        loads.fetch_add(1, Ordering::SeqCst);
        Ok(name.to_string())
    }

    #[tokio::test]
    async fn test_evicts_least_recently_used() {
        let cache: ModelCache<String> = ModelCache::new(2);
        let loads = AtomicUsize::new(0);

        cache.get_or_load(&key("a"), || load_counted(&loads, "a")).await.unwrap();
        cache.get_or_load(&key("b"), || load_counted(&loads, "b")).await.unwrap();
        // Touch "a" so "b" becomes the eviction candidate
        cache.get_or_load(&key("a"), || load_counted(&loads, "a")).await.unwrap();
        cache.get_or_load(&key("c"), || load_counted(&loads, "c")).await.unwrap();

        assert_eq!(cache.len().await, 2);
        assert_eq!(loads.load(Ordering::SeqCst), 3);

        // "b" was evicted and must load again; "a" is still cached
        cache.get_or_load(&key("b"), || load_counted(&loads, "b")).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 4);
        cache.get_or_load(&key("a"), || load_counted(&loads, "a")).await.unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_adapter_and_device_are_part_of_the_key() {
        let cache: ModelCache<usize> = ModelCache::new(2);
        let loads = AtomicUsize::new(0);

        let base = key("a");
        let with_adapter = ModelKey {
            adapter_path: Some("/adapters/chat".to_string()),
            ..base.clone()
        };

        for k in [&base, &with_adapter, &base, &with_adapter] {
            cache
                .get_or_load(k, || async {
                    Ok(loads.fetch_add(1, Ordering::SeqCst))
                })
                .await
                .unwrap();
        }

        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let cache: ModelCache<String> = ModelCache::new(2);

        let result = cache
            .get_or_load(&key("bad"), || async {
                Err(crate::RagServeError::ModelNotFound("bad".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert_eq!(cache.len().await, 0);

        let value = cache
            .get_or_load(&key("bad"), || async { Ok("recovered".to_string()) })
            .await
            .unwrap();
        assert_eq!(*value, "recovered");
    }
}
