//! Render options
//!
//! Recognized keys are named fields; anything else lands in `extra` and is
//! carried through to the cache key untouched. [`RenderOptions::serialize`] is
//! the single canonical form used for hashing: keys are sorted, unset fields and
//! false flags are omitted, and the post-decode `image_info` / post-generation
//! `mtime` annotations are never included.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::ThumbnailError;
use crate::format::ImageFormat;

/// Boolean option keys that enable a transform.
pub const FLAG_KEYS: &[&str] = &[
    "autocrop",
    "fit_x",
    "fit_y",
    "invert",
    "pad",
    "round",
    "round-box",
    "round-wide",
    "ltbx",
];

/// Information captured from the decoded source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub format: Option<String>,
    pub width: u32,
    pub height: u32,
    pub color_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub format: Option<ImageFormat>,
    pub quality: Option<u8>,
    pub upscale: Option<bool>,
    pub crop: Option<String>,
    pub colorspace: Option<String>,
    pub blur: Option<u32>,
    pub autocrop: bool,
    pub fit_x: bool,
    pub fit_y: bool,
    pub invert: bool,
    pub pad: bool,
    pub round: bool,
    pub round_box: bool,
    pub round_wide: bool,
    pub ltbx: bool,
    /// Passthrough keys with no dedicated field
    #[serde(default)]
    pub extra: BTreeMap<String, Value>,
    /// Injected after decode
    #[serde(skip)]
    pub image_info: Option<ImageInfo>,
    /// Source modification time (seconds since epoch), injected after generation
    #[serde(skip)]
    pub mtime: Option<u64>,
}

impl RenderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RenderOptions::set`].
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Result<Self, ThumbnailError> {
        self.set(key, value)?;
        Ok(self)
    }

    /// Set an option by its wire name.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<(), ThumbnailError> {
        let value = value.into();
        match key {
            "format" => {
                let s = value.as_str().ok_or_else(|| invalid(key, &value))?;
                self.format = Some(s.parse()?);
            }
            "quality" => {
                let q = value
                    .as_u64()
                    .filter(|q| (1..=100).contains(q))
                    .ok_or_else(|| invalid(key, &value))?;
                self.quality = Some(q as u8);
            }
            "upscale" => self.upscale = Some(truthy(&value)),
            "crop" => {
                self.crop = match &value {
                    Value::String(s) => Some(s.clone()),
                    Value::Bool(true) => Some("center".to_string()),
                    Value::Bool(false) | Value::Null => None,
                    _ => return Err(invalid(key, &value)),
                }
            }
            "colorspace" => {
                let s = value.as_str().ok_or_else(|| invalid(key, &value))?;
                self.colorspace = Some(s.to_ascii_uppercase());
            }
            "blur" => {
                let b = value.as_u64().ok_or_else(|| invalid(key, &value))?;
                self.blur = Some(b as u32);
            }
            "image_info" | "mtime" => {
                return Err(ThumbnailError::InvalidOption(format!(
                    "{} is reserved and cannot be set by callers",
                    key
                )))
            }
            _ => match self.flag_mut(key) {
                Some(flag) => *flag = truthy(&value),
                None => {
                    self.extra.insert(key.to_string(), value);
                }
            },
        }
        Ok(())
    }

    fn flag_mut(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            "autocrop" => Some(&mut self.autocrop),
            "fit_x" => Some(&mut self.fit_x),
            "fit_y" => Some(&mut self.fit_y),
            "invert" => Some(&mut self.invert),
            "pad" => Some(&mut self.pad),
            "round" => Some(&mut self.round),
            "round-box" | "round_box" => Some(&mut self.round_box),
            "round-wide" | "round_wide" => Some(&mut self.round_wide),
            "ltbx" => Some(&mut self.ltbx),
            _ => None,
        }
    }

    fn flag(&self, key: &str) -> Option<bool> {
        match key {
            "autocrop" => Some(self.autocrop),
            "fit_x" => Some(self.fit_x),
            "fit_y" => Some(self.fit_y),
            "invert" => Some(self.invert),
            "pad" => Some(self.pad),
            "round" => Some(self.round),
            "round-box" | "round_box" => Some(self.round_box),
            "round-wide" | "round_wide" => Some(self.round_wide),
            "ltbx" => Some(self.ltbx),
            _ => None,
        }
    }

    /// Whether `key` is present and truthy.
    pub fn is_enabled(&self, key: &str) -> bool {
        if let Some(flag) = self.flag(key) {
            return flag;
        }
        match key {
            "format" => self.format.is_some(),
            "quality" => self.quality.is_some(),
            "upscale" => self.upscale.unwrap_or(false),
            "crop" => self.crop.is_some(),
            "colorspace" => self.colorspace.is_some(),
            "blur" => self.blur.is_some_and(|b| b > 0),
            _ => self.extra.get(key).is_some_and(truthy),
        }
    }

    /// Key-sorted map of every set option, excluding `image_info` and `mtime`.
    pub fn canonical(&self) -> BTreeMap<String, Value> {
        let mut map = self.extra.clone();
        if let Some(format) = self.format {
            map.insert("format".into(), Value::from(format.as_str()));
        }
        if let Some(quality) = self.quality {
            map.insert("quality".into(), Value::from(quality));
        }
        if let Some(upscale) = self.upscale {
            map.insert("upscale".into(), Value::from(upscale));
        }
        if let Some(crop) = &self.crop {
            map.insert("crop".into(), Value::from(crop.as_str()));
        }
        if let Some(colorspace) = &self.colorspace {
            map.insert("colorspace".into(), Value::from(colorspace.as_str()));
        }
        if let Some(blur) = self.blur {
            map.insert("blur".into(), Value::from(blur));
        }
        for key in FLAG_KEYS {
            if self.flag(key) == Some(true) {
                map.insert((*key).into(), Value::Bool(true));
            }
        }
        map
    }

    /// Canonical JSON used in cache keys and path hashes.
    pub fn serialize(&self) -> String {
        // BTreeMap<String, Value> always serializes
        serde_json::to_string(&self.canonical()).unwrap_or_default()
    }
}

fn invalid(key: &str, value: &Value) -> ThumbnailError {
    ThumbnailError::InvalidOption(format!("Invalid value for {}: {}", key, value))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
