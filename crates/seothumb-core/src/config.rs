//! Configuration module
//!
//! [`ThumbnailSettings::default`] is the library baseline. Deployments override
//! it through environment variables (optionally from a `.env` file). The
//! baseline matters beyond defaults: settings-derived extras are only folded
//! into render options when they differ from it, so already generated
//! thumbnails keep their names.

use std::env;
use std::path::PathBuf;

use crate::format::ImageFormat;
use crate::storage_types::StorageBackend;

const PREFIX: &str = "cache/";
const QUALITY: u8 = 95;
const DUMMY_SOURCE: &str = "https://dummyimage.com/{width}x{height}";
const DUMMY_RATIO: f32 = 1.5;
const COLORSPACE: &str = "RGB";
const MASK_DIR: &str = "masks";
const CACHE_CAPACITY: usize = 10_000;
const LOCAL_STORAGE_PATH: &str = "media";
const LOCAL_STORAGE_BASE_URL: &str = "/media";

#[derive(Clone, Debug, PartialEq)]
pub struct ThumbnailSettings {
    /// Prepended to every rendition path
    pub prefix: String,
    pub format: ImageFormat,
    pub quality: u8,
    pub upscale: bool,
    /// Keep the source encoding when the caller does not ask for one
    pub preserve_format: bool,
    /// Serve placeholders for missing or unreadable sources
    pub dummy: bool,
    /// Placeholder URL template with `{width}` and `{height}` slots
    pub dummy_source: String,
    /// width / height used when a placeholder geometry has one side
    pub dummy_ratio: f32,
    /// Extra density variants, e.g. `[1.5, 2.0]`
    pub alternative_resolutions: Vec<f32>,
    pub colorspace: String,
    pub blur: u32,
    /// Directory holding the corner masks
    pub mask_dir: PathBuf,
    /// Entries kept by the in-memory registry
    pub cache_capacity: usize,
    pub storage_backend: StorageBackend,
    pub local_storage_path: PathBuf,
    pub local_storage_base_url: String,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        ThumbnailSettings {
            prefix: PREFIX.to_string(),
            format: ImageFormat::Jpeg,
            quality: QUALITY,
            upscale: false,
            preserve_format: false,
            dummy: false,
            dummy_source: DUMMY_SOURCE.to_string(),
            dummy_ratio: DUMMY_RATIO,
            alternative_resolutions: Vec::new(),
            colorspace: COLORSPACE.to_string(),
            blur: 0,
            mask_dir: PathBuf::from(MASK_DIR),
            cache_capacity: CACHE_CAPACITY,
            storage_backend: StorageBackend::Local,
            local_storage_path: PathBuf::from(LOCAL_STORAGE_PATH),
            local_storage_base_url: LOCAL_STORAGE_BASE_URL.to_string(),
        }
    }
}

impl ThumbnailSettings {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys keep the baseline.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let baseline = ThumbnailSettings::default();

        let settings = ThumbnailSettings {
            prefix: lookup("THUMBNAIL_PREFIX").unwrap_or(baseline.prefix),
            format: match lookup("THUMBNAIL_FORMAT") {
                Some(s) => s
                    .parse()
                    .map_err(|_| anyhow::anyhow!("THUMBNAIL_FORMAT must be JPEG, PNG, GIF or WEBP"))?,
                None => baseline.format,
            },
            quality: match lookup("THUMBNAIL_QUALITY") {
                Some(s) => s
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("THUMBNAIL_QUALITY must be a valid number"))?,
                None => baseline.quality,
            },
            upscale: parse_bool(lookup("THUMBNAIL_UPSCALE"), baseline.upscale),
            preserve_format: parse_bool(
                lookup("THUMBNAIL_PRESERVE_FORMAT"),
                baseline.preserve_format,
            ),
            dummy: parse_bool(lookup("THUMBNAIL_DUMMY"), baseline.dummy),
            dummy_source: lookup("THUMBNAIL_DUMMY_SOURCE").unwrap_or(baseline.dummy_source),
            dummy_ratio: match lookup("THUMBNAIL_DUMMY_RATIO") {
                Some(s) => s
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("THUMBNAIL_DUMMY_RATIO must be a number"))?,
                None => baseline.dummy_ratio,
            },
            alternative_resolutions: match lookup("THUMBNAIL_ALTERNATIVE_RESOLUTIONS") {
                Some(s) => s
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| {
                        v.parse::<f32>().map_err(|_| {
                            anyhow::anyhow!("Invalid alternative resolution: {}", v)
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
                None => baseline.alternative_resolutions,
            },
            colorspace: lookup("THUMBNAIL_COLORSPACE")
                .map(|s| s.trim().to_ascii_uppercase())
                .unwrap_or(baseline.colorspace),
            blur: lookup("THUMBNAIL_BLUR")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(baseline.blur),
            mask_dir: lookup("THUMBNAIL_MASK_DIR")
                .map(PathBuf::from)
                .unwrap_or(baseline.mask_dir),
            cache_capacity: lookup("THUMBNAIL_CACHE_CAPACITY")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(baseline.cache_capacity),
            storage_backend: match lookup("STORAGE_BACKEND") {
                Some(s) => s.parse()?,
                None => baseline.storage_backend,
            },
            local_storage_path: lookup("LOCAL_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(baseline.local_storage_path),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL")
                .unwrap_or(baseline.local_storage_base_url),
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(1..=100).contains(&self.quality) {
            return Err(anyhow::anyhow!("THUMBNAIL_QUALITY must be between 1 and 100"));
        }

        if self.dummy_ratio <= 0.0 || !self.dummy_ratio.is_finite() {
            return Err(anyhow::anyhow!("THUMBNAIL_DUMMY_RATIO must be positive"));
        }

        if let Some(bad) = self
            .alternative_resolutions
            .iter()
            .find(|r| **r <= 0.0 || !r.is_finite())
        {
            return Err(anyhow::anyhow!(
                "THUMBNAIL_ALTERNATIVE_RESOLUTIONS contains a non-positive value: {}",
                bad
            ));
        }

        if self.cache_capacity == 0 {
            return Err(anyhow::anyhow!("THUMBNAIL_CACHE_CAPACITY must be greater than zero"));
        }

        if !matches!(self.colorspace.as_str(), "RGB" | "GRAY") {
            return Err(anyhow::anyhow!("THUMBNAIL_COLORSPACE must be RGB or GRAY"));
        }

        Ok(())
    }
}

fn parse_bool(value: Option<String>, default: bool) -> bool {
    value
        .map(|s| s.trim().to_lowercase())
        .and_then(|s| match s.as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}
