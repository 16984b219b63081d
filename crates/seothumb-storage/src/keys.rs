//! Shared name validation and URL building for storage backends.

use crate::traits::{StorageError, StorageResult};

/// Reject names that could escape the backend root.
pub fn validate_name(name: &str) -> StorageResult<()> {
    if name.is_empty() {
        return Err(StorageError::InvalidKey("Storage name is empty".to_string()));
    }
    if name.starts_with('/') || name.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(
            "Storage name contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Join a base URL and a name, percent-encoding each path segment.
pub fn generate_url(base_url: &str, name: &str) -> String {
    let encoded: Vec<String> = name
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{}/{}", base_url.trim_end_matches('/'), encoded.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("cache/a/b.jpg").is_ok());
        assert!(validate_name("cache/a..b.jpg").is_ok());
        assert!(validate_name("../etc/passwd").is_err());
        assert!(validate_name("a/../../b").is_err());
        assert!(validate_name("/etc/passwd").is_err());
        assert!(validate_name("").is_err());
    }

    #[test]
    fn test_generate_url_encodes_segments() {
        assert_eq!(
            generate_url("http://localhost/media/", "cache/my photo.jpg"),
            "http://localhost/media/cache/my%20photo.jpg"
        );
    }
}
