mod helpers;

use helpers::{png_bytes, CountingStorage, Harness};
use seothumb::{
    LocalStorage, RenderOptions, Storage, Thumbnail, ThumbnailError, ThumbnailSettings,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;

async fn harness_with_source(settings: ThumbnailSettings, name: &str) -> Harness {
    let harness = Harness::new(settings);
    harness.sources.save(name, png_bytes(400, 200)).await.unwrap();
    harness
}

fn rendition(thumbnail: Option<Thumbnail>) -> seothumb::Rendition {
    match thumbnail {
        Some(Thumbnail::Image(r)) => r,
        other => panic!("expected an image rendition, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generates_and_registers() {
    let h = harness_with_source(ThumbnailSettings::default(), "photos/Cat Picture.png").await;

    let thumb = h
        .backend
        .get_thumbnail(Some("photos/Cat Picture.png"), "100x100", RenderOptions::new())
        .await
        .unwrap();
    let r = rendition(thumb);

    assert!(r.exists());
    assert_eq!(r.size(), Some((100, 50)));
    assert!(r.name().starts_with("cache/photos/100x100/"));
    assert!(r.name().ends_with("/cat-picture.jpg"));
    assert!(h.thumbnails.exists(r.name()).await.unwrap());

    let info = r.options().image_info.as_ref().unwrap();
    assert_eq!((info.width, info.height), (400, 200));
    assert!(r.options().mtime.is_some());

    assert_eq!(h.decodes(), 1);
    assert_eq!(h.cleanups(), 1);

    let registry = h.backend.registry();
    let record = registry.get(r.key()).await.unwrap().unwrap();
    assert_eq!(record.name, r.name());

    let source = seothumb::SourceImage::new("photos/Cat Picture.png", h.sources.as_ref());
    let source_record = registry.get(source.key()).await.unwrap().unwrap();
    assert_eq!(source_record.size, Some((400, 200)));
    assert_eq!(
        registry.thumbnails_of(source.key()).await.unwrap(),
        vec![r.key().to_string()]
    );
}

#[tokio::test]
async fn test_second_request_is_served_from_registry() {
    let h = harness_with_source(ThumbnailSettings::default(), "a.png").await;
    let options = RenderOptions::new().with("crop", "center").unwrap();

    let first = rendition(
        h.backend
            .get_thumbnail(Some("a.png"), "80x80", options.clone())
            .await
            .unwrap(),
    );
    h.reset_counters();

    let second = rendition(
        h.backend
            .get_thumbnail(Some("a.png"), "80x80", options)
            .await
            .unwrap(),
    );

    assert_eq!(first.name(), second.name());
    assert_eq!(second.size(), Some((80, 80)));
    assert_eq!(h.decodes(), 0);
    assert_eq!(h.kv.gets.load(Ordering::SeqCst), 1);
    assert_eq!(h.thumbnails.exists_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.sources.opens.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_registry_entry_without_file_is_regenerated() {
    let h = harness_with_source(ThumbnailSettings::default(), "a.png").await;
    let first = rendition(
        h.backend
            .get_thumbnail(Some("a.png"), "60x60", RenderOptions::new())
            .await
            .unwrap(),
    );
    h.thumbnails.delete(first.name()).await.unwrap();
    assert!(h.backend.registry().get(first.key()).await.unwrap().is_some());
    h.reset_counters();

    let second = rendition(
        h.backend
            .get_thumbnail(Some("a.png"), "60x60", RenderOptions::new())
            .await
            .unwrap(),
    );

    assert_eq!(second.name(), first.name());
    assert!(second.exists());
    assert_eq!(second.size(), Some((60, 30)));
    assert_eq!(h.decodes(), 1);
    assert_eq!(h.thumbnails.saves.load(Ordering::SeqCst), 1);
    assert!(h.thumbnails.exists(second.name()).await.unwrap());
}

#[tokio::test]
async fn test_existing_file_is_never_overwritten() {
    let first = harness_with_source(ThumbnailSettings::default(), "a.png").await;
    let name = rendition(
        first
            .backend
            .get_thumbnail(Some("a.png"), "50x50", RenderOptions::new())
            .await
            .unwrap(),
    )
    .name()
    .to_string();

    // Same storages, empty registry, stale bytes already at the destination
    let thumbnails = Arc::new(CountingStorage::memory("thumbnails"));
    thumbnails.save(&name, b"stale".to_vec()).await.unwrap();
    let h = Harness::with_thumbnails(ThumbnailSettings::default(), thumbnails);
    h.sources.save("a.png", png_bytes(400, 200)).await.unwrap();
    h.thumbnails.reset();

    let r = rendition(
        h.backend
            .get_thumbnail(Some("a.png"), "50x50", RenderOptions::new())
            .await
            .unwrap(),
    );

    assert_eq!(r.name(), name);
    assert!(r.exists());
    assert_eq!(h.decodes(), 0);
    assert_eq!(h.thumbnails.saves.load(Ordering::SeqCst), 0);
    assert_eq!(h.thumbnails.open(&name).await.unwrap(), b"stale".to_vec());
    assert!(h.backend.registry().get(r.key()).await.unwrap().is_some());
}

#[tokio::test]
async fn test_no_source() {
    let h = Harness::new(ThumbnailSettings::default());
    let thumb = h
        .backend
        .get_thumbnail(None, "100x100", RenderOptions::new())
        .await
        .unwrap();
    assert!(thumb.is_none());

    let h = Harness::new(ThumbnailSettings {
        dummy: true,
        ..ThumbnailSettings::default()
    });
    let thumb = h
        .backend
        .get_thumbnail(None, "100x100", RenderOptions::new())
        .await
        .unwrap()
        .unwrap();
    assert!(thumb.is_dummy());
    assert_eq!(thumb.url(), "https://dummyimage.com/100x100");
}

#[tokio::test]
async fn test_missing_source_degrades() {
    let h = Harness::new(ThumbnailSettings::default());
    let r = rendition(
        h.backend
            .get_thumbnail(Some("missing.jpg"), "100x100", RenderOptions::new())
            .await
            .unwrap(),
    );
    assert!(!r.exists());
    assert_eq!(h.decodes(), 0);
    assert!(h.backend.registry().get(r.key()).await.unwrap().is_none());

    let h = Harness::new(ThumbnailSettings {
        dummy: true,
        ..ThumbnailSettings::default()
    });
    let thumb = h
        .backend
        .get_thumbnail(Some("missing.jpg"), "100x", RenderOptions::new())
        .await
        .unwrap()
        .unwrap();
    assert!(thumb.is_dummy());
    assert_eq!(thumb.size(), Some((100, 67)));
}

#[tokio::test]
async fn test_undecodable_source_degrades() {
    let h = Harness::new(ThumbnailSettings::default());
    h.sources
        .save("broken.jpg", b"definitely not a jpeg".to_vec())
        .await
        .unwrap();

    let r = rendition(
        h.backend
            .get_thumbnail(Some("broken.jpg"), "100x100", RenderOptions::new())
            .await
            .unwrap(),
    );
    assert!(!r.exists());
    assert_eq!(h.decodes(), 1);
    assert_eq!(h.cleanups(), 0);
    assert_eq!(h.thumbnails.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_alternative_resolutions() {
    let h = harness_with_source(
        ThumbnailSettings {
            alternative_resolutions: vec![2.0, 1.5],
            ..ThumbnailSettings::default()
        },
        "a.png",
    )
    .await;

    let r = rendition(
        h.backend
            .get_thumbnail(Some("a.png"), "100x50", RenderOptions::new())
            .await
            .unwrap(),
    );
    let base = r.name().trim_end_matches(".jpg");

    assert!(h.thumbnails.exists(&format!("{}@2x.jpg", base)).await.unwrap());
    assert!(h.thumbnails.exists(&format!("{}@1.5x.jpg", base)).await.unwrap());
    assert_eq!(h.thumbnails.saves.load(Ordering::SeqCst), 3);
    assert_eq!(h.decodes(), 1);
}

#[tokio::test]
async fn test_invalidate_removes_renditions() {
    let h = harness_with_source(ThumbnailSettings::default(), "a.png").await;
    let small = rendition(
        h.backend
            .get_thumbnail(Some("a.png"), "50x50", RenderOptions::new())
            .await
            .unwrap(),
    );
    let large = rendition(
        h.backend
            .get_thumbnail(Some("a.png"), "200x200", RenderOptions::new())
            .await
            .unwrap(),
    );

    assert_eq!(h.backend.invalidate("a.png").await.unwrap(), 2);
    assert!(!h.thumbnails.exists(small.name()).await.unwrap());
    assert!(!h.thumbnails.exists(large.name()).await.unwrap());
    assert!(h.backend.registry().get(small.key()).await.unwrap().is_none());

    h.reset_counters();
    let again = rendition(
        h.backend
            .get_thumbnail(Some("a.png"), "50x50", RenderOptions::new())
            .await
            .unwrap(),
    );
    assert_eq!(again.name(), small.name());
    assert_eq!(h.decodes(), 1);
}

#[tokio::test]
async fn test_missing_mask_is_fatal() {
    let masks = tempfile::tempdir().unwrap();
    let h = harness_with_source(
        ThumbnailSettings {
            mask_dir: masks.path().to_path_buf(),
            ..ThumbnailSettings::default()
        },
        "a.png",
    )
    .await;

    let options = RenderOptions::new().with("round", true).unwrap();
    let result = h
        .backend
        .get_thumbnail(Some("a.png"), "100x100", options)
        .await;

    assert!(matches!(result, Err(ThumbnailError::MissingMask(_))));
    assert_eq!(h.cleanups(), 1);
    assert_eq!(h.thumbnails.saves.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_options_change_the_path() {
    let h = harness_with_source(ThumbnailSettings::default(), "a.png").await;

    let plain = rendition(
        h.backend
            .get_thumbnail(Some("a.png"), "100x100", RenderOptions::new())
            .await
            .unwrap(),
    );
    let padded = rendition(
        h.backend
            .get_thumbnail(
                Some("a.png"),
                "100x100",
                RenderOptions::new().with("pad", true).unwrap(),
            )
            .await
            .unwrap(),
    );

    assert_ne!(plain.name(), padded.name());
    assert_eq!(plain.size(), Some((100, 50)));
    assert_eq!(padded.size(), Some((100, 100)));
}

#[tokio::test]
async fn test_preserve_format() {
    let h = harness_with_source(
        ThumbnailSettings {
            preserve_format: true,
            ..ThumbnailSettings::default()
        },
        "logo.png",
    )
    .await;

    let r = rendition(
        h.backend
            .get_thumbnail(Some("logo.png"), "40x40", RenderOptions::new())
            .await
            .unwrap(),
    );
    assert!(r.name().ends_with("/logo.png"));

    let bytes = h.thumbnails.open(r.name()).await.unwrap();
    assert_eq!(image::guess_format(&bytes).unwrap(), image::ImageFormat::Png);
}

#[tokio::test]
async fn test_local_storage_concurrent_requests() {
    let dir = tempfile::tempdir().unwrap();
    let local = LocalStorage::new(dir.path().join("media"), "/media".to_string())
        .await
        .unwrap();
    let thumbnails = Arc::new(CountingStorage::new(Arc::new(local)));
    let h = Harness::with_thumbnails(ThumbnailSettings::default(), thumbnails);
    h.sources.save("a.png", png_bytes(400, 200)).await.unwrap();

    let (one, two) = tokio::join!(
        h.backend
            .get_thumbnail(Some("a.png"), "120x120", RenderOptions::new()),
        h.backend
            .get_thumbnail(Some("a.png"), "120x120", RenderOptions::new()),
    );
    let (one, two) = (rendition(one.unwrap()), rendition(two.unwrap()));

    assert_eq!(one.name(), two.name());
    let path = dir.path().join("media").join(one.name());
    assert!(path.is_file());
    assert_eq!(one.url(), format!("/media/{}", one.name()));
}
