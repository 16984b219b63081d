//! Cache-aware thumbnail orchestration
//!
//! A request is answered in one of three ways:
//! - the registry knows the rendition and the file is still there (fast path)
//! - the file is there but the registry forgot it (re-register only)
//! - nothing is there yet (decode, transform, encode, save, register)
//!
//! An existing destination file is never regenerated. Stale renditions have to
//! be removed with [`ThumbnailBackend::invalidate`] first.

use seothumb_cache::{MemoryKvStore, RenditionRegistry};
use seothumb_core::{
    Geometry, ImageFormat, LogLevel, RenderOptions, ThumbnailError, ThumbnailResult,
    ThumbnailSettings,
};
use seothumb_processing::{ImageEngine, RasterEngine, ScopedImage, TransformPipeline};
use seothumb_storage::{create_storage, Storage, StorageError};
use std::path::Path;
use std::sync::Arc;
use std::time::{Instant, UNIX_EPOCH};

use crate::images::{DummyRendition, Rendition, SourceImage, Thumbnail};
use crate::namer::{alternative_name, PathNamer};
use crate::slug::Slugifier;

/// Output of the blocking decode/transform/encode step
struct Rendered {
    source_size: (u32, u32),
    options: RenderOptions,
    bytes: Vec<u8>,
    size: (u32, u32),
    alternatives: Vec<(f32, Vec<u8>)>,
}

/// Log a generation failure at the level its kind calls for.
fn report(err: &ThumbnailError, source: &str, geometry: &Geometry, message: &str) {
    match err.log_level() {
        LogLevel::Debug => {
            tracing::debug!(source = %source, geometry = %geometry, error = %err, "{}", message)
        }
        LogLevel::Warn => {
            tracing::warn!(source = %source, geometry = %geometry, error = %err, "{}", message)
        }
        LogLevel::Error => {
            tracing::error!(source = %source, geometry = %geometry, error = %err, "{}", message)
        }
    }
}

pub struct ThumbnailBackend {
    settings: ThumbnailSettings,
    source_storage: Arc<dyn Storage>,
    thumbnail_storage: Arc<dyn Storage>,
    engine: Arc<dyn ImageEngine>,
    pipeline: Arc<TransformPipeline>,
    registry: RenditionRegistry,
    namer: PathNamer,
}

impl ThumbnailBackend {
    pub fn new(
        settings: ThumbnailSettings,
        source_storage: Arc<dyn Storage>,
        thumbnail_storage: Arc<dyn Storage>,
        engine: Arc<dyn ImageEngine>,
        registry: RenditionRegistry,
    ) -> Self {
        let pipeline = Arc::new(TransformPipeline::standard(&settings.mask_dir));
        let namer = PathNamer::new(settings.prefix.clone()).with_source_root(source_storage.root());
        Self {
            settings,
            source_storage,
            thumbnail_storage,
            engine,
            pipeline,
            registry,
            namer,
        }
    }

    /// Wire up the default services: one storage for sources and thumbnails,
    /// the raster engine and an in-memory registry.
    pub async fn from_settings(settings: ThumbnailSettings) -> ThumbnailResult<Self> {
        settings
            .validate()
            .map_err(|e| ThumbnailError::Configuration(e.to_string()))?;

        let storage = create_storage(&settings).await?;
        let store = MemoryKvStore::new(settings.cache_capacity)?;
        let registry = RenditionRegistry::new(Arc::new(store));

        tracing::info!(
            backend = %settings.storage_backend,
            prefix = %settings.prefix,
            "Thumbnail backend initialized"
        );

        Ok(Self::new(
            settings,
            storage.clone(),
            storage,
            Arc::new(RasterEngine),
            registry,
        ))
    }

    pub fn with_slugifier(mut self, slugifier: Arc<dyn Slugifier>) -> Self {
        self.namer = self.namer.with_slugifier(slugifier);
        self
    }

    pub fn with_pipeline(mut self, pipeline: TransformPipeline) -> Self {
        self.pipeline = Arc::new(pipeline);
        self
    }

    pub fn settings(&self) -> &ThumbnailSettings {
        &self.settings
    }

    pub fn registry(&self) -> &RenditionRegistry {
        &self.registry
    }

    pub fn namer(&self) -> &PathNamer {
        &self.namer
    }

    pub fn source_storage(&self) -> &Arc<dyn Storage> {
        &self.source_storage
    }

    pub fn thumbnail_storage(&self) -> &Arc<dyn Storage> {
        &self.thumbnail_storage
    }

    /// Resolve a thumbnail of `source` at `geometry`, generating it if needed.
    ///
    /// Returns `Ok(None)` only when there is no source and dummies are off.
    /// An unreadable source degrades to a dummy, or to a rendition with
    /// `exists() == false`, instead of failing.
    pub async fn get_thumbnail(
        &self,
        source: Option<&str>,
        geometry: &str,
        options: RenderOptions,
    ) -> ThumbnailResult<Option<Thumbnail>> {
        let start = Instant::now();
        let geometry = Geometry::parse(geometry)?;

        let source_name = match source {
            Some(name) if !name.is_empty() => name,
            _ => return Ok(self.dummy(&geometry)),
        };

        let mut source = SourceImage::new(source_name, self.source_storage.as_ref());
        let options = self.merge_options(source.name(), options);
        let name = self.namer.compute_path(&source, &geometry, &options);
        let mut rendition = Rendition::new(name, self.thumbnail_storage.as_ref(), options);

        if let Some(record) = self.registry.get(rendition.key()).await? {
            if self.thumbnail_storage.exists(&record.name).await? {
                tracing::debug!(name = %record.name, geometry = %geometry, "Thumbnail cache hit");
                let options = rendition.options().clone();
                return Ok(Some(Thumbnail::Image(Rendition::from_record(
                    record,
                    self.thumbnail_storage.as_ref(),
                    options,
                ))));
            }
        }

        if self.thumbnail_storage.exists(rendition.name()).await? {
            tracing::debug!(name = %rendition.name(), "Thumbnail exists, registering only");
            rendition.mark_existing();
        } else {
            match self.create_thumbnail(&mut source, &geometry, &mut rendition).await {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => {
                    report(&e, source.name(), &geometry, "Returning degraded thumbnail");
                    return Ok(match self.dummy(&geometry) {
                        Some(dummy) => Some(dummy),
                        None => Some(Thumbnail::Image(rendition)),
                    });
                }
                Err(e) => {
                    report(&e, source.name(), &geometry, "Thumbnail generation failed");
                    return Err(e);
                }
            }
        }

        rendition.options_mut().mtime = self.source_mtime(&source).await?;

        let source_record = source.record();
        self.registry.get_or_set(&source_record).await?;
        self.registry
            .set(&rendition.record(), Some(&source_record))
            .await?;

        tracing::info!(
            source = %source.name(),
            name = %rendition.name(),
            geometry = %geometry,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Thumbnail resolved"
        );

        Ok(Some(Thumbnail::Image(rendition)))
    }

    /// Delete every registered rendition of `source` and forget them.
    ///
    /// Returns the number of renditions removed.
    pub async fn invalidate(&self, source: &str) -> ThumbnailResult<usize> {
        let source = SourceImage::new(source, self.source_storage.as_ref());
        let records = self.registry.delete_thumbnails(source.key()).await?;

        for record in &records {
            self.thumbnail_storage.delete(&record.name).await?;
            for factor in &self.settings.alternative_resolutions {
                self.thumbnail_storage
                    .delete(&alternative_name(&record.name, *factor))
                    .await?;
            }
        }
        self.registry.delete(source.key()).await?;

        tracing::info!(
            source = %source.name(),
            count = records.len(),
            "Invalidated thumbnails"
        );
        Ok(records.len())
    }

    fn dummy(&self, geometry: &Geometry) -> Option<Thumbnail> {
        self.settings
            .dummy
            .then(|| Thumbnail::Dummy(DummyRendition::new(&self.settings, geometry)))
    }

    /// Caller options win, then preserved source format, then defaults.
    /// Colorspace and blur from settings are only added when they differ from
    /// the library baseline so existing paths stay stable.
    fn merge_options(&self, source_name: &str, mut options: RenderOptions) -> RenderOptions {
        if options.format.is_none() && self.settings.preserve_format {
            let detected = Path::new(source_name)
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension);
            options.format = Some(detected.unwrap_or(self.settings.format));
        }
        options.format.get_or_insert(self.settings.format);
        options.quality.get_or_insert(self.settings.quality);
        options.upscale.get_or_insert(self.settings.upscale);

        let baseline = ThumbnailSettings::default();
        if options.colorspace.is_none() && self.settings.colorspace != baseline.colorspace {
            options.colorspace = Some(self.settings.colorspace.clone());
        }
        if options.blur.is_none() && self.settings.blur != baseline.blur {
            options.blur = Some(self.settings.blur);
        }
        options
    }

    async fn create_thumbnail(
        &self,
        source: &mut SourceImage,
        geometry: &Geometry,
        rendition: &mut Rendition,
    ) -> ThumbnailResult<()> {
        let data = self
            .source_storage
            .open(source.name())
            .await
            .map_err(|e| ThumbnailError::SourceUnreadable {
                name: source.name().to_string(),
                source: e.into(),
            })?;

        let rendered = self.render(data, source.name(), geometry, rendition.options().clone()).await?;
        source.set_size(rendered.source_size);

        self.ensure_directory(rendition.name()).await?;
        self.thumbnail_storage
            .save(rendition.name(), rendered.bytes)
            .await?;
        for (factor, bytes) in rendered.alternatives {
            let name = alternative_name(rendition.name(), factor);
            self.thumbnail_storage.save(&name, bytes).await?;
        }

        *rendition.options_mut() = rendered.options;
        rendition.mark_written(rendered.size);
        Ok(())
    }

    /// Decode, transform and encode off the async runtime.
    async fn render(
        &self,
        data: Vec<u8>,
        source_name: &str,
        geometry: &Geometry,
        mut options: RenderOptions,
    ) -> ThumbnailResult<Rendered> {
        let engine = self.engine.clone();
        let pipeline = self.pipeline.clone();
        let geometry = geometry.clone();
        let source_name = source_name.to_string();
        let factors = self.settings.alternative_resolutions.clone();
        let format = options.format.unwrap_or(self.settings.format);
        let quality = options.quality.unwrap_or(self.settings.quality);

        tokio::task::spawn_blocking(move || -> ThumbnailResult<Rendered> {
            let engine = engine.as_ref();
            let decoded = engine
                .get_image(&data)
                .map_err(|e| ThumbnailError::SourceUnreadable {
                    name: source_name,
                    source: e.into(),
                })?;
            let image = ScopedImage::new(engine, decoded);

            let source_size = engine.get_image_size(&image);
            options.image_info = Some(engine.get_image_info(&image, &data));

            let render_at = |geometry: &Geometry| -> ThumbnailResult<(Vec<u8>, (u32, u32))> {
                let target = geometry.resolve(source_size.0, source_size.1);
                let output = pipeline.execute((*image).clone(), target, &options)?;
                let size = (output.width(), output.height());
                let bytes = engine.write(&output, format, quality)?;
                Ok((bytes, size))
            };

            let (bytes, size) = render_at(&geometry)?;
            let alternatives = factors
                .iter()
                .map(|factor| render_at(&geometry.scaled(*factor)).map(|(b, _)| (*factor, b)))
                .collect::<ThumbnailResult<Vec<_>>>()?;

            Ok(Rendered {
                source_size,
                options,
                bytes,
                size,
                alternatives,
            })
        })
        .await
        .map_err(|e| ThumbnailError::Internal(format!("Render task failed: {}", e)))?
    }

    async fn ensure_directory(&self, name: &str) -> ThumbnailResult<()> {
        let Some(path) = self.thumbnail_storage.path_for(name)? else {
            return Ok(());
        };
        let Some(parent) = path.parent() else {
            return Ok(());
        };
        match tokio::fs::create_dir_all(parent).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn source_mtime(&self, source: &SourceImage) -> ThumbnailResult<Option<u64>> {
        match self.source_storage.modified_time(source.name()).await {
            Ok(modified) => Ok(modified
                .duration_since(UNIX_EPOCH)
                .ok()
                .map(|d| d.as_secs())),
            Err(StorageError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
