use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("static slug pattern"));
static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-\s]+").expect("static slug pattern"));

#[derive(Debug, Error)]
pub enum SlugError {
    #[error("Cannot slugify {0:?}: contains control characters or path separators")]
    Unsupported(String),
}

/// Turns a file stem into a URL-friendly fragment.
pub trait Slugifier: Send + Sync {
    fn slugify(&self, value: &str) -> Result<String, SlugError>;
}

/// ASCII-only, lower-case, words joined by single hyphens.
///
/// Accented letters are decomposed first so they keep their base letter;
/// whatever is still non-ASCII afterwards is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultSlugifier;

impl Slugifier for DefaultSlugifier {
    fn slugify(&self, value: &str) -> Result<String, SlugError> {
        if value.chars().any(|c| c.is_control() || c == '/' || c == '\\') {
            return Err(SlugError::Unsupported(value.to_string()));
        }

        let ascii: String = value.nfkd().filter(char::is_ascii).collect();
        let lowered = ascii.to_ascii_lowercase();
        let cleaned = NON_WORD.replace_all(&lowered, "");
        let joined = SEPARATORS.replace_all(cleaned.trim(), "-");
        Ok(joined.trim_matches(|c| c == '-' || c == '_').to_string())
    }
}
