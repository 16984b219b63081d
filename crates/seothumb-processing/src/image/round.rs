use image::{imageops, DynamicImage, ImageReader};
use seothumb_core::RenderOptions;
use std::path::{Path, PathBuf};

use crate::pipeline::{Transform, TransformError};

/// Option key and the mask file it selects, in lookup order
const MASKS: &[(&str, &str)] = &[
    ("round", "round.png"),
    ("round-box", "round-box.png"),
    ("round-wide", "round-wide.png"),
];

/// Overlay a corner mask read from the mask directory.
pub struct RoundCorners {
    mask_dir: PathBuf,
}

impl RoundCorners {
    pub fn new(mask_dir: impl Into<PathBuf>) -> Self {
        Self {
            mask_dir: mask_dir.into(),
        }
    }

    /// Path of the mask selected by `options`, if any rounding flag is set.
    pub fn mask_path(&self, options: &RenderOptions) -> Option<PathBuf> {
        MASKS
            .iter()
            .find(|(key, _)| options.is_enabled(key))
            .map(|(_, file)| self.mask_dir.join(file))
    }

    fn load_mask(path: &Path) -> Result<image::RgbaImage, TransformError> {
        if !path.is_file() {
            return Err(TransformError::MissingMask(path.to_path_buf()));
        }
        let invalid = |message: String| TransformError::InvalidMask {
            path: path.to_path_buf(),
            message,
        };
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| invalid(e.to_string()))?;
        let mask = reader.decode().map_err(|e| invalid(e.to_string()))?;
        Ok(mask.to_rgba8())
    }
}

impl Transform for RoundCorners {
    fn name(&self) -> &'static str {
        "round"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["round", "round-box", "round-wide"]
    }

    fn apply(
        &self,
        img: DynamicImage,
        _target: (u32, u32),
        options: &RenderOptions,
    ) -> Result<DynamicImage, TransformError> {
        let Some(path) = self.mask_path(options) else {
            return Ok(img);
        };
        let mask = Self::load_mask(&path)?;

        let mut img_rgba = img.to_rgba8();
        imageops::overlay(&mut img_rgba, &mask, 0, 0);
        Ok(DynamicImage::ImageRgba8(img_rgba))
    }
}
