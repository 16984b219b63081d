//! Seothumb Cache Library
//!
//! Bookkeeping for generated renditions: which images are known, their
//! dimensions, and which renditions were produced from each source.

pub mod kv;
pub mod registry;

pub use kv::{CacheError, CacheResult, KvBackend, MemoryKvStore};
pub use registry::{ImageRecord, RenditionRegistry};
