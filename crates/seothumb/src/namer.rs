//! Rendition path naming
//!
//! `<prefix><source dirs>/<geometry>/<hash[0:2]>/<hash[2:4]>/<slug>.<ext>`
//!
//! The hash covers the source key, the geometry token and the canonical
//! options, so any change in what gets rendered lands on a new path.

use seothumb_core::{tokey, Geometry, RenderOptions};
use std::sync::Arc;

use crate::images::SourceImage;
use crate::slug::{DefaultSlugifier, Slugifier};

pub struct PathNamer {
    prefix: String,
    source_root: Option<String>,
    slugifier: Arc<dyn Slugifier>,
}

impl PathNamer {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            source_root: None,
            slugifier: Arc::new(DefaultSlugifier),
        }
    }

    /// Root stripped from source names that carry it.
    pub fn with_source_root(mut self, root: Option<String>) -> Self {
        self.source_root = root;
        self
    }

    pub fn with_slugifier(mut self, slugifier: Arc<dyn Slugifier>) -> Self {
        self.slugifier = slugifier;
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn compute_path(
        &self,
        source: &SourceImage,
        geometry: &Geometry,
        options: &RenderOptions,
    ) -> String {
        let name = self.relative_name(source.name());
        let mut segments: Vec<&str> = name.split('/').filter(|s| !s.is_empty()).collect();
        let filename = segments.pop().unwrap_or_default();

        let key = tokey([source.key(), geometry.token(), options.serialize().as_str()]);

        let (stem, original_ext) = match filename.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
            _ => (filename, None),
        };
        let slug = match self.slugifier.slugify(stem) {
            Ok(slug) => slug,
            Err(e) => {
                tracing::debug!(error = %e, stem = %stem, "Keeping original file stem");
                stem.to_string()
            }
        };
        let slug = if slug.is_empty() { key.clone() } else { slug };

        let ext = options.format.map(|f| f.extension()).or(original_ext);
        let filename = match ext {
            Some(ext) => format!("{}.{}", slug, ext),
            None => slug,
        };

        let mut parts: Vec<&str> = segments;
        parts.push(geometry.token());
        parts.push(&key[0..2]);
        parts.push(&key[2..4]);
        parts.push(&filename);

        self.with_prefix(&parts.join("/"))
    }

    /// Prepend the prefix unless `path` already carries it.
    pub fn with_prefix(&self, path: &str) -> String {
        if self.prefix.is_empty() || path.starts_with(&self.prefix) {
            return path.to_string();
        }
        if self.prefix.ends_with('/') {
            format!("{}{}", self.prefix, path)
        } else {
            format!("{}/{}", self.prefix, path)
        }
    }

    fn relative_name<'a>(&self, name: &'a str) -> &'a str {
        match &self.source_root {
            Some(root) if !root.is_empty() => name
                .strip_prefix(root.as_str())
                .map(|rest| rest.trim_start_matches('/'))
                .unwrap_or(name),
            _ => name,
        }
    }
}

/// Sibling name for a high-DPI variant: `a/b/photo.jpg` at 2 → `a/b/photo@2x.jpg`.
pub fn alternative_name(name: &str, factor: f32) -> String {
    let (dir, filename) = match name.rsplit_once('/') {
        Some((dir, filename)) => (Some(dir), filename),
        None => (None, name),
    };
    let filename = match filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{}@{}x.{}", stem, factor, ext),
        None => format!("{}@{}x", filename, factor),
    };
    match dir {
        Some(dir) => format!("{}/{}", dir, filename),
        None => filename,
    }
}
