use image::DynamicImage;
use seothumb_core::RenderOptions;

use crate::pipeline::{Transform, TransformError};

/// Convert to greyscale when `colorspace` is `GRAY`; `RGB` is a no-op.
pub struct Colorspace;

impl Transform for Colorspace {
    fn name(&self) -> &'static str {
        "colorspace"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["colorspace"]
    }

    fn apply(
        &self,
        img: DynamicImage,
        _target: (u32, u32),
        options: &RenderOptions,
    ) -> Result<DynamicImage, TransformError> {
        match options.colorspace.as_deref() {
            Some("GRAY") => Ok(img.grayscale()),
            _ => Ok(img),
        }
    }
}

/// Gaussian blur with the `blur` radius as sigma
pub struct Blur;

impl Transform for Blur {
    fn name(&self) -> &'static str {
        "blur"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["blur"]
    }

    fn apply(
        &self,
        img: DynamicImage,
        _target: (u32, u32),
        options: &RenderOptions,
    ) -> Result<DynamicImage, TransformError> {
        let sigma = match options.blur {
            Some(radius) if radius > 0 => radius as f32,
            _ => return Ok(img),
        };
        let blurred = imageproc::filter::gaussian_blur_f32(&img.to_rgba8(), sigma);
        Ok(DynamicImage::ImageRgba8(blurred))
    }
}

/// Photometric negative; alpha is left alone.
pub struct Invert;

impl Transform for Invert {
    fn name(&self) -> &'static str {
        "invert"
    }

    fn triggers(&self) -> &'static [&'static str] {
        &["invert"]
    }

    fn apply(
        &self,
        mut img: DynamicImage,
        _target: (u32, u32),
        _options: &RenderOptions,
    ) -> Result<DynamicImage, TransformError> {
        img.invert();
        Ok(img)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    fn image() -> DynamicImage {
        let mut img = RgbaImage::from_pixel(20, 20, Rgba([10, 20, 30, 200]));
        img.put_pixel(10, 10, Rgba([250, 250, 250, 200]));
        DynamicImage::ImageRgba8(img)
    }

    #[test]
    fn test_invert_negates_colour_keeps_alpha() {
        let options = RenderOptions::new().with("invert", true).unwrap();
        let out = Invert.apply(image(), (20, 20), &options).unwrap();
        assert_eq!(out.get_pixel(0, 0), Rgba([245, 235, 225, 200]));
    }

    #[test]
    fn test_gray_colorspace() {
        let options = RenderOptions::new().with("colorspace", "gray").unwrap();
        assert!(Colorspace.is_active(&options));
        let out = Colorspace.apply(image(), (20, 20), &options).unwrap();
        let Rgba([r, g, b, _]) = out.get_pixel(0, 0);
        assert!(r == g && g == b);
    }

    #[test]
    fn test_rgb_colorspace_is_identity() {
        let options = RenderOptions::new().with("colorspace", "RGB").unwrap();
        let out = Colorspace.apply(image(), (20, 20), &options).unwrap();
        assert_eq!(out.get_pixel(0, 0), Rgba([10, 20, 30, 200]));
    }

    #[test]
    fn test_blur_spreads_bright_pixel() {
        let options = RenderOptions::new().with("blur", 2).unwrap();
        let out = Blur.apply(image(), (20, 20), &options).unwrap();
        assert_eq!(out.dimensions(), (20, 20));
        assert!(out.get_pixel(11, 10)[0] > 10);
        assert!(out.get_pixel(10, 10)[0] < 250);
    }
}
