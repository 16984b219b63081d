//! Seothumb Processing Library
//!
//! Decoding and encoding go through the [`ImageEngine`] trait; the pixel-space
//! transforms live under [`image`] and are chained by [`TransformPipeline`] in a
//! fixed order.

pub mod engine;
pub mod image;
pub mod pipeline;

pub use engine::{EngineError, ImageEngine, RasterEngine, ScopedImage};
pub use pipeline::{Transform, TransformError, TransformPipeline};

/// Raster type handled by every transform
pub use ::image::DynamicImage;
