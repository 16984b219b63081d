//! Seothumb Core Library
//!
//! This crate provides the domain types shared by every seothumb component:
//! render options and their canonical serialization, geometry strings, output
//! formats, settings loaded from the environment, and the error taxonomy.

pub mod config;
pub mod error;
pub mod format;
pub mod geometry;
pub mod hashing;
pub mod options;
pub mod storage_types;

// Re-export commonly used types
pub use config::ThumbnailSettings;
pub use error::{LogLevel, ThumbnailError, ThumbnailResult};
pub use format::ImageFormat;
pub use geometry::Geometry;
pub use hashing::tokey;
pub use options::{ImageInfo, RenderOptions};
pub use storage_types::StorageBackend;
