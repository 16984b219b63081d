#![allow(dead_code)]

use async_trait::async_trait;
use seothumb::{
    ImageEngine, KvBackend, MemoryKvStore, MemoryStorage, RasterEngine, RenditionRegistry,
    Storage, ThumbnailBackend, ThumbnailSettings,
};
use seothumb_cache::CacheResult;
use seothumb_core::{ImageFormat, ImageInfo, StorageBackend};
use seothumb_processing::{DynamicImage, EngineError};
use seothumb_storage::StorageResult;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

/// Storage wrapper that counts calls
pub struct CountingStorage {
    inner: Arc<dyn Storage>,
    pub exists_calls: AtomicUsize,
    pub opens: AtomicUsize,
    pub saves: AtomicUsize,
}

impl CountingStorage {
    pub fn new(inner: Arc<dyn Storage>) -> Self {
        Self {
            inner,
            exists_calls: AtomicUsize::new(0),
            opens: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn memory(label: &str) -> Self {
        Self::new(Arc::new(MemoryStorage::new(label, "/media")))
    }

    pub fn reset(&self) {
        self.exists_calls.store(0, Ordering::SeqCst);
        self.opens.store(0, Ordering::SeqCst);
        self.saves.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl Storage for CountingStorage {
    fn identifier(&self) -> String {
        self.inner.identifier()
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }

    fn root(&self) -> Option<String> {
        self.inner.root()
    }

    fn path_for(&self, name: &str) -> StorageResult<Option<PathBuf>> {
        self.inner.path_for(name)
    }

    fn url(&self, name: &str) -> String {
        self.inner.url(name)
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(name).await
    }

    async fn open(&self, name: &str) -> StorageResult<Vec<u8>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.inner.open(name).await
    }

    async fn save(&self, name: &str, data: Vec<u8>) -> StorageResult<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(name, data).await
    }

    async fn modified_time(&self, name: &str) -> StorageResult<SystemTime> {
        self.inner.modified_time(name).await
    }

    async fn delete(&self, name: &str) -> StorageResult<()> {
        self.inner.delete(name).await
    }
}

/// Raster engine that counts decodes and cleanups
#[derive(Default)]
pub struct CountingEngine {
    pub decodes: AtomicUsize,
    pub cleanups: AtomicUsize,
}

impl ImageEngine for CountingEngine {
    fn get_image(&self, data: &[u8]) -> Result<DynamicImage, EngineError> {
        self.decodes.fetch_add(1, Ordering::SeqCst);
        RasterEngine.get_image(data)
    }

    fn get_image_info(&self, image: &DynamicImage, data: &[u8]) -> ImageInfo {
        RasterEngine.get_image_info(image, data)
    }

    fn write(
        &self,
        image: &DynamicImage,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EngineError> {
        RasterEngine.write(image, format, quality)
    }

    fn cleanup(&self, image: DynamicImage) {
        self.cleanups.fetch_add(1, Ordering::SeqCst);
        drop(image);
    }
}

/// Key-value store that counts reads
pub struct CountingKv {
    inner: MemoryKvStore,
    pub gets: AtomicUsize,
}

impl CountingKv {
    pub fn new() -> Self {
        Self {
            inner: MemoryKvStore::new(256).unwrap(),
            gets: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl KvBackend for CountingKv {
    async fn get_raw(&self, key: &str) -> CacheResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get_raw(key).await
    }

    async fn set_raw(&self, key: &str, value: String) -> CacheResult<()> {
        self.inner.set_raw(key, value).await
    }

    async fn delete_raw(&self, key: &str) -> CacheResult<()> {
        self.inner.delete_raw(key).await
    }
}

pub struct Harness {
    pub backend: ThumbnailBackend,
    pub sources: Arc<CountingStorage>,
    pub thumbnails: Arc<CountingStorage>,
    pub engine: Arc<CountingEngine>,
    pub kv: Arc<CountingKv>,
}

impl Harness {
    pub fn new(settings: ThumbnailSettings) -> Self {
        Self::with_thumbnails(settings, Arc::new(CountingStorage::memory("thumbnails")))
    }

    pub fn with_thumbnails(settings: ThumbnailSettings, thumbnails: Arc<CountingStorage>) -> Self {
        let sources = Arc::new(CountingStorage::memory("sources"));
        let engine = Arc::new(CountingEngine::default());
        let kv = Arc::new(CountingKv::new());
        let backend = ThumbnailBackend::new(
            settings,
            sources.clone(),
            thumbnails.clone(),
            engine.clone(),
            RenditionRegistry::new(kv.clone()),
        );
        Self {
            backend,
            sources,
            thumbnails,
            engine,
            kv,
        }
    }

    pub fn reset_counters(&self) {
        self.sources.reset();
        self.thumbnails.reset();
        self.engine.decodes.store(0, Ordering::SeqCst);
        self.engine.cleanups.store(0, Ordering::SeqCst);
        self.kv.gets.store(0, Ordering::SeqCst);
    }

    pub fn decodes(&self) -> usize {
        self.engine.decodes.load(Ordering::SeqCst)
    }

    pub fn cleanups(&self) -> usize {
        self.engine.cleanups.load(Ordering::SeqCst)
    }
}

/// Solid-colour PNG
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 30, 30, 255]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .unwrap();
    buffer
}
