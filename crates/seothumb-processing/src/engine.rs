//! Decode/encode engine
//!
//! The orchestrator never touches codecs directly. It asks an [`ImageEngine`]
//! for a raster, for information about it, and for encoded bytes, and hands
//! the raster back through [`ImageEngine::cleanup`] once it is done.

use image::{DynamicImage, GenericImageView, ImageReader};
use seothumb_core::{ImageFormat, ImageInfo, ThumbnailError};
use std::io::Cursor;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image as {format}: {message}")]
    Encode { format: ImageFormat, message: String },
}

impl From<EngineError> for ThumbnailError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Decode(msg) => ThumbnailError::SourceUnreadable {
                name: String::new(),
                source: anyhow::anyhow!(msg),
            },
            encode @ EngineError::Encode { .. } => ThumbnailError::Encode(encode.to_string()),
        }
    }
}

pub trait ImageEngine: Send + Sync {
    /// Decode raw bytes into a raster.
    fn get_image(&self, data: &[u8]) -> Result<DynamicImage, EngineError>;

    /// Format and colour information about a decoded raster.
    fn get_image_info(&self, image: &DynamicImage, data: &[u8]) -> ImageInfo;

    fn get_image_size(&self, image: &DynamicImage) -> (u32, u32) {
        image.dimensions()
    }

    /// Encode a raster.
    fn write(
        &self,
        image: &DynamicImage,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EngineError>;

    /// Release a raster obtained from [`ImageEngine::get_image`].
    fn cleanup(&self, image: DynamicImage) {
        drop(image);
    }
}

/// Engine backed by the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct RasterEngine;

impl RasterEngine {
    fn codec_format(format: ImageFormat) -> image::ImageFormat {
        match format {
            ImageFormat::Jpeg => image::ImageFormat::Jpeg,
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Gif => image::ImageFormat::Gif,
            ImageFormat::Webp => image::ImageFormat::WebP,
        }
    }
}

impl ImageEngine for RasterEngine {
    fn get_image(&self, data: &[u8]) -> Result<DynamicImage, EngineError> {
        let cursor = Cursor::new(data);
        let reader = ImageReader::new(cursor)
            .with_guessed_format()
            .map_err(|e| EngineError::Decode(e.to_string()))?;
        reader
            .decode()
            .map_err(|e| EngineError::Decode(e.to_string()))
    }

    fn get_image_info(&self, img: &DynamicImage, data: &[u8]) -> ImageInfo {
        let (width, height) = img.dimensions();
        ImageInfo {
            format: image::guess_format(data).ok().map(|f| format!("{:?}", f)),
            width,
            height,
            color_type: format!("{:?}", img.color()),
        }
    }

    fn write(
        &self,
        img: &DynamicImage,
        format: ImageFormat,
        quality: u8,
    ) -> Result<Vec<u8>, EngineError> {
        let (width, height) = img.dimensions();
        let mut buffer = Vec::with_capacity(width as usize * height as usize * 3);
        let encode_err = |e: image::ImageError| EngineError::Encode {
            format,
            message: e.to_string(),
        };

        match format {
            ImageFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
                let encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
                rgb.write_with_encoder(encoder).map_err(encode_err)?;
            }
            ImageFormat::Png => {
                img.write_to(&mut Cursor::new(&mut buffer), Self::codec_format(format))
                    .map_err(encode_err)?;
            }
            ImageFormat::Gif | ImageFormat::Webp => {
                let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
                rgba.write_to(&mut Cursor::new(&mut buffer), Self::codec_format(format))
                    .map_err(encode_err)?;
            }
        }

        Ok(buffer)
    }
}

/// Raster that is returned to its engine on every exit path.
pub struct ScopedImage<'a> {
    engine: &'a dyn ImageEngine,
    image: Option<DynamicImage>,
}

impl<'a> ScopedImage<'a> {
    pub fn new(engine: &'a dyn ImageEngine, image: DynamicImage) -> Self {
        ScopedImage {
            engine,
            image: Some(image),
        }
    }
}

impl Deref for ScopedImage<'_> {
    type Target = DynamicImage;

    fn deref(&self) -> &DynamicImage {
        self.image.as_ref().expect("image is only taken on drop")
    }
}

impl DerefMut for ScopedImage<'_> {
    fn deref_mut(&mut self) -> &mut DynamicImage {
        self.image.as_mut().expect("image is only taken on drop")
    }
}

impl Drop for ScopedImage<'_> {
    fn drop(&mut self) {
        if let Some(image) = self.image.take() {
            self.engine.cleanup(image);
        }
    }
}
