//! Source and rendition descriptors
//!
//! These are plain values. Storage access goes through the backend that
//! created them.

use seothumb_cache::ImageRecord;
use seothumb_core::{tokey, Geometry, RenderOptions, ThumbnailSettings};
use seothumb_storage::Storage;

/// An original image, identified by its name inside a storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    name: String,
    key: String,
    size: Option<(u32, u32)>,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, storage: &dyn Storage) -> Self {
        let name = name.into();
        let key = tokey([name.as_str(), storage.identifier().as_str()]);
        Self {
            name,
            key,
            size: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Known once the source has been decoded
    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    pub fn set_size(&mut self, size: (u32, u32)) {
        self.size = Some(size);
    }

    pub fn record(&self) -> ImageRecord {
        ImageRecord {
            name: self.name.clone(),
            key: self.key.clone(),
            size: self.size,
        }
    }
}

/// A generated (or expected) thumbnail
#[derive(Debug, Clone, PartialEq)]
pub struct Rendition {
    name: String,
    key: String,
    url: String,
    exists: bool,
    size: Option<(u32, u32)>,
    options: RenderOptions,
}

impl Rendition {
    pub fn new(name: impl Into<String>, storage: &dyn Storage, options: RenderOptions) -> Self {
        let name = name.into();
        let key = tokey([name.as_str(), storage.identifier().as_str()]);
        let url = storage.url(&name);
        Self {
            name,
            key,
            url,
            exists: false,
            size: None,
            options,
        }
    }

    pub(crate) fn from_record(record: ImageRecord, storage: &dyn Storage, options: RenderOptions) -> Self {
        Self {
            url: storage.url(&record.name),
            name: record.name,
            key: record.key,
            exists: true,
            size: record.size,
            options,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn exists(&self) -> bool {
        self.exists
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        self.size
    }

    /// Final options, including `image_info` and `mtime` once generated.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub(crate) fn mark_written(&mut self, size: (u32, u32)) {
        self.exists = true;
        self.size = Some(size);
    }

    pub(crate) fn mark_existing(&mut self) {
        self.exists = true;
    }

    pub(crate) fn options_mut(&mut self) -> &mut RenderOptions {
        &mut self.options
    }

    pub fn record(&self) -> ImageRecord {
        ImageRecord {
            name: self.name.clone(),
            key: self.key.clone(),
            size: self.size,
        }
    }
}

/// Placeholder served when there is no usable source
#[derive(Debug, Clone, PartialEq)]
pub struct DummyRendition {
    url: String,
    size: (u32, u32),
}

impl DummyRendition {
    /// A missing side is derived from `dummy_ratio` (width / height).
    pub fn new(settings: &ThumbnailSettings, geometry: &Geometry) -> Self {
        let ratio = settings.dummy_ratio as f64;
        let size = match (geometry.width, geometry.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, ((w as f64 / ratio).round() as u32).max(1)),
            (None, Some(h)) => (((h as f64 * ratio).round() as u32).max(1), h),
            (None, None) => (1, 1),
        };
        let url = settings
            .dummy_source
            .replace("{width}", &size.0.to_string())
            .replace("{height}", &size.1.to_string());
        Self { url, size }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }
}

/// What [`crate::ThumbnailBackend::get_thumbnail`] hands back
#[derive(Debug, Clone, PartialEq)]
pub enum Thumbnail {
    Image(Rendition),
    Dummy(DummyRendition),
}

impl Thumbnail {
    /// Storage name for images, the placeholder url for dummies.
    pub fn name(&self) -> &str {
        match self {
            Thumbnail::Image(r) => r.name(),
            Thumbnail::Dummy(d) => d.url(),
        }
    }

    pub fn exists(&self) -> bool {
        match self {
            Thumbnail::Image(r) => r.exists(),
            Thumbnail::Dummy(_) => true,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Thumbnail::Image(r) => r.url(),
            Thumbnail::Dummy(d) => d.url(),
        }
    }

    pub fn size(&self) -> Option<(u32, u32)> {
        match self {
            Thumbnail::Image(r) => r.size(),
            Thumbnail::Dummy(d) => Some(d.size()),
        }
    }

    pub fn is_dummy(&self) -> bool {
        matches!(self, Thumbnail::Dummy(_))
    }
}
