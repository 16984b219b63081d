use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use seothumb_core::RenderOptions;

use crate::pipeline::{Transform, TransformError};

/// Select appropriate filter type based on resize ratio
pub fn select_filter(orig_width: u32, orig_height: u32, new_width: u32, new_height: u32) -> FilterType {
    let width_ratio = orig_width as f32 / new_width.max(1) as f32;
    let height_ratio = orig_height as f32 / new_height.max(1) as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        FilterType::Triangle
    } else if max_ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}

/// Resize image to exact dimensions
pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (orig_width, orig_height) = img.dimensions();
    let filter = select_filter(orig_width, orig_height, width, height);
    img.resize_exact(width, height, filter)
}

fn scaled(value: u32, factor: f64) -> u32 {
    ((value as f64 * factor).round() as u32).max(1)
}

/// Scale into (or, with `crop`, over) the requested box.
///
/// Never enlarges unless `upscale` is set. Always active.
pub struct Scale;

impl Transform for Scale {
    fn name(&self) -> &'static str {
        "scale"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &[]
    }

    fn is_active(&self, _options: &RenderOptions) -> bool {
        true
    }

    fn apply(
        &self,
        img: DynamicImage,
        target: (u32, u32),
        options: &RenderOptions,
    ) -> Result<DynamicImage, TransformError> {
        let (width, height) = img.dimensions();
        let x_factor = target.0 as f64 / width as f64;
        let y_factor = target.1 as f64 / height as f64;
        let factor = if options.crop.is_some() {
            x_factor.max(y_factor)
        } else {
            x_factor.min(y_factor)
        };

        let upscale = options.upscale.unwrap_or(false);
        if factor < 1.0 || (factor > 1.0 && upscale) {
            let (new_width, new_height) = (scaled(width, factor), scaled(height, factor));
            if (new_width, new_height) != (width, height) {
                return Ok(resize_image(&img, new_width, new_height));
            }
        }
        Ok(img)
    }
}

/// Where the crop window sits inside an oversized image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropAnchor {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

impl CropAnchor {
    /// Unknown anchors fall back to center.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => CropAnchor::Top,
            "bottom" => CropAnchor::Bottom,
            "left" => CropAnchor::Left,
            "right" => CropAnchor::Right,
            _ => CropAnchor::Center,
        }
    }

    fn offsets(&self, width: u32, height: u32, crop_width: u32, crop_height: u32) -> (u32, u32) {
        let center_x = (width - crop_width) / 2;
        let center_y = (height - crop_height) / 2;
        match self {
            CropAnchor::Center => (center_x, center_y),
            CropAnchor::Top => (center_x, 0),
            CropAnchor::Bottom => (center_x, height - crop_height),
            CropAnchor::Left => (0, center_y),
            CropAnchor::Right => (width - crop_width, center_y),
        }
    }
}

/// Cut the requested box out of the scaled image.
pub struct Crop;

impl Transform for Crop {
    fn name(&self) -> &'static str {
        "crop"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["crop"]
    }

    fn apply(
        &self,
        img: DynamicImage,
        target: (u32, u32),
        options: &RenderOptions,
    ) -> Result<DynamicImage, TransformError> {
        let (width, height) = img.dimensions();
        let crop_width = target.0.min(width);
        let crop_height = target.1.min(height);
        if (crop_width, crop_height) == (width, height) {
            return Ok(img);
        }

        let anchor = options
            .crop
            .as_deref()
            .map(CropAnchor::parse)
            .unwrap_or_default();
        let (x, y) = anchor.offsets(width, height, crop_width, crop_height);
        Ok(img.crop_imm(x, y, crop_width, crop_height))
    }
}

/// Match one requested side exactly, the other follows the aspect ratio.
///
/// `fit_y` wins when both flags are set.
pub struct Fit;

impl Transform for Fit {
    fn name(&self) -> &'static str {
        "fit"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["fit_y", "fit_x"]
    }

    fn apply(
        &self,
        img: DynamicImage,
        target: (u32, u32),
        options: &RenderOptions,
    ) -> Result<DynamicImage, TransformError> {
        let (width, height) = img.dimensions();
        let (new_width, new_height) = if options.fit_y {
            let factor = target.1 as f64 / height as f64;
            (scaled(width, factor), target.1)
        } else {
            let factor = target.0 as f64 / width as f64;
            (target.0, scaled(height, factor))
        };

        if (new_width, new_height) == (width, height) {
            return Ok(img);
        }
        Ok(img.resize_exact(new_width, new_height, FilterType::Lanczos3))
    }
}
