//! Rendition registry
//!
//! Every known image is stored under `seothumb||image||<key>` as a JSON
//! [`ImageRecord`]. Sources additionally keep the list of rendition keys made
//! from them under `seothumb||thumbnails||<key>`.

use crate::kv::{CacheError, CacheResult, KvBackend};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const PREFIX: &str = "seothumb";

/// What the registry remembers about one image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub name: String,
    pub key: String,
    /// `None` until the image has been decoded once
    pub size: Option<(u32, u32)>,
}

impl ImageRecord {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            size: None,
        }
    }

    pub fn with_size(mut self, size: (u32, u32)) -> Self {
        self.size = Some(size);
        self
    }
}

#[derive(Clone)]
pub struct RenditionRegistry {
    backend: Arc<dyn KvBackend>,
}

impl RenditionRegistry {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self { backend }
    }

    fn image_key(key: &str) -> String {
        format!("{}||image||{}", PREFIX, key)
    }

    fn thumbnails_key(key: &str) -> String {
        format!("{}||thumbnails||{}", PREFIX, key)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> CacheResult<Option<T>> {
        match self.backend.get_raw(key).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|source| CacheError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> CacheResult<()> {
        let raw = serde_json::to_string(value).map_err(|source| CacheError::Corrupt {
            key: key.to_string(),
            source,
        })?;
        self.backend.set_raw(key, raw).await
    }

    /// Look up an image by key.
    pub async fn get(&self, key: &str) -> CacheResult<Option<ImageRecord>> {
        self.get_json(&Self::image_key(key)).await
    }

    /// Store `record`, and when `source` is given remember it as one of the
    /// source's renditions.
    pub async fn set(&self, record: &ImageRecord, source: Option<&ImageRecord>) -> CacheResult<()> {
        self.set_json(&Self::image_key(&record.key), record).await?;

        if let Some(source) = source {
            let list_key = Self::thumbnails_key(&source.key);
            let mut thumbnails: Vec<String> = self.get_json(&list_key).await?.unwrap_or_default();
            if !thumbnails.contains(&record.key) {
                thumbnails.push(record.key.clone());
                self.set_json(&list_key, &thumbnails).await?;
            }
        }

        tracing::debug!(name = %record.name, key = %record.key, "Registered image");
        Ok(())
    }

    /// Return the stored record for `record.key`, storing `record` first if
    /// nothing is known yet.
    pub async fn get_or_set(&self, record: &ImageRecord) -> CacheResult<ImageRecord> {
        if let Some(existing) = self.get(&record.key).await? {
            return Ok(existing);
        }
        self.set(record, None).await?;
        Ok(record.clone())
    }

    pub async fn delete(&self, key: &str) -> CacheResult<()> {
        self.backend.delete_raw(&Self::image_key(key)).await
    }

    /// Keys of every rendition registered for `source_key`.
    pub async fn thumbnails_of(&self, source_key: &str) -> CacheResult<Vec<String>> {
        Ok(self
            .get_json(&Self::thumbnails_key(source_key))
            .await?
            .unwrap_or_default())
    }

    /// Forget every rendition of `source_key` and return their records.
    pub async fn delete_thumbnails(&self, source_key: &str) -> CacheResult<Vec<ImageRecord>> {
        let mut removed = Vec::new();
        for key in self.thumbnails_of(source_key).await? {
            if let Some(record) = self.get(&key).await? {
                removed.push(record);
            }
            self.delete(&key).await?;
        }
        self.backend
            .delete_raw(&Self::thumbnails_key(source_key))
            .await?;
        Ok(removed)
    }
}
