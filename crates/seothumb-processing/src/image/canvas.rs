use image::{imageops, DynamicImage, GenericImageView, Rgba, RgbaImage};
use seothumb_core::RenderOptions;

use crate::image::resize::resize_image;
use crate::pipeline::{Transform, TransformError};

/// Background for padded and letterboxed output
pub const PADDING_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Centre `img` on a `PADDING_COLOR` canvas of the target size.
fn center_on_canvas(img: &DynamicImage, target: (u32, u32)) -> DynamicImage {
    let (width, height) = img.dimensions();
    let mut canvas = RgbaImage::from_pixel(target.0, target.1, PADDING_COLOR);
    let x = (target.0 as i64 - width as i64) / 2;
    let y = (target.1 as i64 - height as i64) / 2;
    imageops::overlay(&mut canvas, &img.to_rgba8(), x, y);
    DynamicImage::ImageRgba8(canvas)
}

/// Pad to exactly the requested box.
pub struct Pad;

impl Transform for Pad {
    fn name(&self) -> &'static str {
        "pad"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["pad"]
    }

    fn apply(
        &self,
        img: DynamicImage,
        target: (u32, u32),
        _options: &RenderOptions,
    ) -> Result<DynamicImage, TransformError> {
        if img.dimensions() == target {
            return Ok(img);
        }
        Ok(center_on_canvas(&img, target))
    }
}

/// Fit inside the requested box, then pad the rest.
pub struct Letterbox;

impl Letterbox {
    fn inner_size(width: u32, height: u32, target: (u32, u32)) -> (u32, u32) {
        let source_ratio = width as f64 / height as f64;
        let target_ratio = target.0 as f64 / target.1 as f64;
        if source_ratio > target_ratio {
            let h = ((target.0 as f64 / source_ratio).round() as u32).max(1);
            (target.0, h)
        } else {
            let w = ((target.1 as f64 * source_ratio).round() as u32).max(1);
            (w, target.1)
        }
    }
}

impl Transform for Letterbox {
    fn name(&self) -> &'static str {
        "letterbox"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["ltbx"]
    }

    fn apply(
        &self,
        img: DynamicImage,
        target: (u32, u32),
        _options: &RenderOptions,
    ) -> Result<DynamicImage, TransformError> {
        let (width, height) = img.dimensions();
        if (width, height) == target {
            return Ok(img);
        }
        let (inner_width, inner_height) = Self::inner_size(width, height, target);
        let inner = if (inner_width, inner_height) == (width, height) {
            img
        } else {
            resize_image(&img, inner_width, inner_height)
        };
        Ok(center_on_canvas(&inner, target))
    }
}
