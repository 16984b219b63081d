//! Pixel-space transforms
//!
//! - autocrop: trim a near-white border
//! - resize: scale to the requested geometry, crop, fit one axis
//! - filters: colorspace, blur, invert
//! - canvas: pad and letterbox onto a fixed background
//! - round: corner masks

pub mod autocrop;
pub mod canvas;
pub mod filters;
pub mod resize;
pub mod round;

pub use autocrop::Autocrop;
pub use canvas::{Letterbox, Pad, PADDING_COLOR};
pub use filters::{Blur, Colorspace, Invert};
pub use resize::{Crop, CropAnchor, Fit, Scale};
pub use round::RoundCorners;
