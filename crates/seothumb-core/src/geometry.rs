use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::ThumbnailError;

/// Requested thumbnail geometry
///
/// Keeps the raw token because it is embedded verbatim in rendition paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Geometry {
    token: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Geometry {
    /// Parse a geometry token: "WxH", "Wx", "xH" or a bare "W".
    pub fn parse(s: &str) -> Result<Self, ThumbnailError> {
        let token = s.trim();
        let (width, height) = match token.split_once('x') {
            Some((w, h)) => (Self::parse_side(w, "width")?, Self::parse_side(h, "height")?),
            None => (Self::parse_side(token, "width")?, None),
        };

        if width.is_none() && height.is_none() {
            return Err(ThumbnailError::InvalidGeometry(format!(
                "At least one dimension must be specified: {:?}",
                s
            )));
        }

        Ok(Geometry {
            token: token.to_string(),
            width,
            height,
        })
    }

    fn parse_side(part: &str, side: &str) -> Result<Option<u32>, ThumbnailError> {
        if part.is_empty() {
            return Ok(None);
        }
        match part.parse::<u32>() {
            Ok(0) | Err(_) => Err(ThumbnailError::InvalidGeometry(format!(
                "Invalid {}: {}",
                side, part
            ))),
            Ok(value) => Ok(Some(value)),
        }
    }

    /// The token exactly as requested.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Fill a missing side from the source aspect ratio.
    pub fn resolve(&self, source_width: u32, source_height: u32) -> (u32, u32) {
        let source_width = source_width.max(1);
        let source_height = source_height.max(1);
        match (self.width, self.height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => {
                let h = (w as f64 * source_height as f64 / source_width as f64).round() as u32;
                (w, h.max(1))
            }
            (None, Some(h)) => {
                let w = (h as f64 * source_width as f64 / source_height as f64).round() as u32;
                (w.max(1), h)
            }
            (None, None) => (source_width, source_height),
        }
    }

    /// Multiply both requested sides, used for high-DPI variants.
    ///
    /// Fractional pixels are truncated.
    pub fn scaled(&self, factor: f32) -> Geometry {
        let scale = |v: u32| ((v as f32 * factor) as u32).max(1);
        let width = self.width.map(scale);
        let height = self.height.map(scale);
        let token = match (width, height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            (Some(w), None) => format!("{}x", w),
            (None, Some(h)) => format!("x{}", h),
            (None, None) => self.token.clone(),
        };
        Geometry {
            token,
            width,
            height,
        }
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.token)
    }
}
