use async_trait::async_trait;
use lru::LruCache;
use seothumb_core::ThumbnailError;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),

    #[error("Corrupt cache entry {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid cache configuration: {0}")]
    Config(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

impl From<CacheError> for ThumbnailError {
    fn from(err: CacheError) -> Self {
        ThumbnailError::Cache(err.to_string())
    }
}

/// Raw string key-value store behind the registry
#[async_trait]
pub trait KvBackend: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set_raw(&self, key: &str, value: String) -> CacheResult<()>;

    async fn delete_raw(&self, key: &str) -> CacheResult<()>;
}

/// Bounded in-process store; least recently used entries are evicted first.
pub struct MemoryKvStore {
    entries: Mutex<LruCache<String, String>>,
}

impl MemoryKvStore {
    pub fn new(capacity: usize) -> CacheResult<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| CacheError::Config("capacity must be greater than 0".into()))?;
        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
        })
    }

    fn lock(&self) -> CacheResult<std::sync::MutexGuard<'_, LruCache<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Backend("kv store mutex poisoned".into()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KvBackend for MemoryKvStore {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set_raw(&self, key: &str, value: String) -> CacheResult<()> {
        self.lock()?.put(key.to_string(), value);
        Ok(())
    }

    async fn delete_raw(&self, key: &str) -> CacheResult<()> {
        self.lock()?.pop(key);
        Ok(())
    }
}
