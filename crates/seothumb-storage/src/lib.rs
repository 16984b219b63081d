//! Seothumb Storage Library
//!
//! This crate provides the blob storage abstraction used for both source images
//! and generated renditions, with a local filesystem and an in-memory backend.
//!
//! # Name format
//!
//! Names are `/`-separated logical paths relative to the backend root, e.g.
//! `cache/photos/300x200/ab/cd/sunset.jpg`. Names must not contain `..` or a
//! leading `/`. Validation lives in the `keys` module so all backends agree.

pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-memory")]
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
pub use seothumb_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
