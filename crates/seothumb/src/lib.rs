//! Seothumb
//!
//! On-demand thumbnails stored under deterministic, SEO-friendly paths.
//!
//! ```text
//! request ─▶ PathNamer ─▶ registry hit? ─▶ file exists? ─▶ done
//!                               │ miss
//!                               ▼
//!              decode ─▶ TransformPipeline ─▶ encode ─▶ save ─▶ register
//! ```
//!
//! [`ThumbnailBackend`] ties the pieces together. Storage, codec engine and
//! registry backend are all injected as trait objects.

pub mod backend;
pub mod images;
pub mod namer;
pub mod slug;
pub mod telemetry;

pub use backend::ThumbnailBackend;
pub use images::{DummyRendition, Rendition, SourceImage, Thumbnail};
pub use namer::{alternative_name, PathNamer};
pub use slug::{DefaultSlugifier, SlugError, Slugifier};
pub use telemetry::init_tracing;

pub use seothumb_cache::{ImageRecord, KvBackend, MemoryKvStore, RenditionRegistry};
pub use seothumb_core::{
    Geometry, ImageFormat, RenderOptions, ThumbnailError, ThumbnailResult, ThumbnailSettings,
};
pub use seothumb_processing::{ImageEngine, RasterEngine, Transform, TransformPipeline};
pub use seothumb_storage::{create_storage, LocalStorage, MemoryStorage, Storage};
