//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use seothumb_core::ThumbnailError;
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage name: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for ThumbnailError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ConfigError(msg) => ThumbnailError::Configuration(msg),
            other => ThumbnailError::Storage(other.to_string()),
        }
    }
}

/// Storage abstraction trait
///
/// Used for source images and for renditions. The orchestrator only relies on
/// this interface, so sources and thumbnails may live in different backends.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stable identifier of this backend instance, mixed into image keys so
    /// equal names in different backends never share a cache entry.
    fn identifier(&self) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Absolute root of the backend, if it has one on the local filesystem.
    fn root(&self) -> Option<String> {
        None
    }

    /// Filesystem path for a name, for backends that are filesystem-backed.
    fn path_for(&self, name: &str) -> StorageResult<Option<PathBuf>>;

    /// Public URL for a name
    fn url(&self, name: &str) -> String;

    /// Check if a file exists
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Read a whole file
    async fn open(&self, name: &str) -> StorageResult<Vec<u8>>;

    /// Write a whole file, replacing any previous content atomically.
    async fn save(&self, name: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Last modification time
    async fn modified_time(&self, name: &str) -> StorageResult<SystemTime>;

    /// Delete a file; deleting a missing file is not an error.
    async fn delete(&self, name: &str) -> StorageResult<()>;
}
