//! Transform pipeline
//!
//! Every transform declares the option keys that switch it on and is otherwise
//! an identity. The pipeline is an explicit ordered list; each step consumes the
//! output of the previous one.

use image::DynamicImage;
use seothumb_core::{RenderOptions, ThumbnailError};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::image::autocrop::Autocrop;
use crate::image::canvas::{Letterbox, Pad};
use crate::image::filters::{Blur, Colorspace, Invert};
use crate::image::resize::{Crop, Fit, Scale};
use crate::image::round::RoundCorners;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Rounding mask not found: {}", .0.display())]
    MissingMask(PathBuf),

    #[error("Failed to load rounding mask {}: {message}", .path.display())]
    InvalidMask { path: PathBuf, message: String },
}

impl From<TransformError> for ThumbnailError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::MissingMask(path) => ThumbnailError::MissingMask(path),
            other => ThumbnailError::Transform(other.to_string()),
        }
    }
}

/// A named pixel-space operation
pub trait Transform: Send + Sync {
    fn name(&self) -> &'static str;

    /// Option keys that activate this transform
    fn triggers(&self) -> &'static [&'static str];

    fn is_active(&self, options: &RenderOptions) -> bool {
        self.triggers().iter().any(|key| options.is_enabled(key))
    }

    fn apply(
        &self,
        img: DynamicImage,
        target: (u32, u32),
        options: &RenderOptions,
    ) -> Result<DynamicImage, TransformError>;
}

pub struct TransformPipeline {
    steps: Vec<Box<dyn Transform>>,
}

impl TransformPipeline {
    /// Build a pipeline from explicit steps, applied in the given order.
    pub fn new(steps: Vec<Box<dyn Transform>>) -> Self {
        Self { steps }
    }

    /// The standard chain:
    /// 1. autocrop
    /// 2. colorspace
    /// 3. scale
    /// 4. crop
    /// 5. fit_y / fit_x
    /// 6. blur
    /// 7. invert
    /// 8. pad
    /// 9. round corners
    /// 10. letterbox
    pub fn standard(mask_dir: impl AsRef<Path>) -> Self {
        Self::new(vec![
            Box::new(Autocrop),
            Box::new(Colorspace),
            Box::new(Scale),
            Box::new(Crop),
            Box::new(Fit),
            Box::new(Blur),
            Box::new(Invert),
            Box::new(Pad),
            Box::new(RoundCorners::new(mask_dir.as_ref())),
            Box::new(Letterbox),
        ])
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every active step against `target`.
    pub fn execute(
        &self,
        mut img: DynamicImage,
        target: (u32, u32),
        options: &RenderOptions,
    ) -> Result<DynamicImage, TransformError> {
        for step in &self.steps {
            if !step.is_active(options) {
                continue;
            }
            let before = (img.width(), img.height());
            img = step.apply(img, target, options)?;
            tracing::debug!(
                transform = step.name(),
                from = ?before,
                to = ?(img.width(), img.height()),
                "Applied transform"
            );
        }
        Ok(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    struct Tag(&'static str, u32);

    impl Transform for Tag {
        fn name(&self) -> &'static str {
            self.0
        }

        fn triggers(&self) -> &'static [&'static str] {
            &["tag"]
        }

        fn apply(
            &self,
            img: DynamicImage,
            _target: (u32, u32),
            _options: &RenderOptions,
        ) -> Result<DynamicImage, TransformError> {
            // Multiplies the width so step order shows up in the result
            Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
                img.width() * self.1,
                img.height(),
                Rgba([0, 0, 0, 255]),
            )))
        }
    }

    fn test_image() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255])))
    }

    #[test]
    fn test_inactive_steps_are_identity() {
        let pipeline = TransformPipeline::new(vec![Box::new(Tag("double", 2))]);
        let out = pipeline
            .execute(test_image(), (10, 10), &RenderOptions::new())
            .unwrap();
        assert_eq!(out.width(), 2);
    }

    #[test]
    fn test_steps_compose_in_order() {
        let pipeline =
            TransformPipeline::new(vec![Box::new(Tag("double", 2)), Box::new(Tag("triple", 3))]);
        let options = RenderOptions::new().with("tag", true).unwrap();
        let out = pipeline.execute(test_image(), (10, 10), &options).unwrap();
        assert_eq!(out.width(), 12);
    }

    #[test]
    fn test_standard_order() {
        let pipeline = TransformPipeline::standard("masks");
        assert_eq!(
            pipeline.step_names(),
            vec![
                "autocrop",
                "colorspace",
                "scale",
                "crop",
                "fit",
                "blur",
                "invert",
                "pad",
                "round",
                "letterbox"
            ]
        );
    }

    #[test]
    fn test_missing_mask_maps_to_fatal_error() {
        let err: ThumbnailError = TransformError::MissingMask(PathBuf::from("m/round.png")).into();
        assert!(matches!(err, ThumbnailError::MissingMask(_)));
        assert!(!err.is_recoverable());
    }
}
