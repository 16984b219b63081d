use crate::keys::{generate_url, validate_name};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::sync::RwLock;

/// In-process storage, useful for tests and for embedding without a disk.
pub struct MemoryStorage {
    label: String,
    base_url: String,
    files: RwLock<HashMap<String, (Vec<u8>, SystemTime)>>,
}

impl MemoryStorage {
    /// `label` identifies the instance in image keys.
    pub fn new(label: impl Into<String>, base_url: impl Into<String>) -> Self {
        MemoryStorage {
            label: label.into(),
            base_url: base_url.into(),
            files: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn identifier(&self) -> String {
        format!("memory:{}", self.label)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }

    fn path_for(&self, name: &str) -> StorageResult<Option<PathBuf>> {
        validate_name(name)?;
        Ok(None)
    }

    fn url(&self, name: &str) -> String {
        generate_url(&self.base_url, name)
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        validate_name(name)?;
        Ok(self.files.read().await.contains_key(name))
    }

    async fn open(&self, name: &str) -> StorageResult<Vec<u8>> {
        validate_name(name)?;
        self.files
            .read()
            .await
            .get(name)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    async fn save(&self, name: &str, data: Vec<u8>) -> StorageResult<()> {
        validate_name(name)?;
        let size = data.len();
        self.files
            .write()
            .await
            .insert(name.to_string(), (data, SystemTime::now()));
        tracing::debug!(name = %name, size_bytes = size, "Memory storage save successful");
        Ok(())
    }

    async fn modified_time(&self, name: &str) -> StorageResult<SystemTime> {
        validate_name(name)?;
        self.files
            .read()
            .await
            .get(name)
            .map(|(_, modified)| *modified)
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    async fn delete(&self, name: &str) -> StorageResult<()> {
        validate_name(name)?;
        self.files.write().await.remove(name);
        Ok(())
    }
}
