use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use seothumb_core::RenderOptions;

use crate::pipeline::{Transform, TransformError};

const BRIGHTNESS: f32 = 1.12;

/// Trim a near-white border.
///
/// The image is brightened so off-white margins saturate to white, then the
/// bounding box of everything that is not pure white is cropped out of the
/// untouched original.
pub struct Autocrop;

fn content_bbox(rgb: &RgbImage) -> Option<(u32, u32, u32, u32)> {
    let mut bbox: Option<(u32, u32, u32, u32)> = None;
    for (x, y, Rgb(channels)) in rgb.enumerate_pixels() {
        let inverted_is_zero = channels
            .iter()
            .all(|c| (*c as f32 * BRIGHTNESS).min(255.0) as u8 == u8::MAX);
        if inverted_is_zero {
            continue;
        }
        bbox = Some(match bbox {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    bbox
}

impl Transform for Autocrop {
    fn name(&self) -> &'static str {
        "autocrop"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["autocrop"]
    }

    fn apply(
        &self,
        img: DynamicImage,
        _target: (u32, u32),
        _options: &RenderOptions,
    ) -> Result<DynamicImage, TransformError> {
        let Some((x0, y0, x1, y1)) = content_bbox(&img.to_rgb8()) else {
            return Ok(img);
        };
        let (width, height) = (x1 - x0 + 1, y1 - y0 + 1);
        if (width, height) == img.dimensions() {
            return Ok(img);
        }
        Ok(img.crop_imm(x0, y0, width, height))
    }
}
