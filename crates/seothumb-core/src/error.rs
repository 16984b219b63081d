//! Error types module
//!
//! All failures that can leave a seothumb component are unified under
//! [`ThumbnailError`]. Leaf crates keep their own error enums and convert into
//! this one at the boundary.

use std::io;
use std::path::PathBuf;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected, caller-side problems such as a malformed geometry
    Debug,
    /// Degraded but recovered results
    Warn,
    /// Backend or deployment faults
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Source unreadable: {name}")]
    SourceUnreadable {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Rounding mask not found: {}", .0.display())]
    MissingMask(PathBuf),

    #[error("Transform failed: {0}")]
    Transform(String),

    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ThumbnailError {
    /// Level at which the error should be reported.
    pub fn log_level(&self) -> LogLevel {
        match self {
            ThumbnailError::InvalidGeometry(_) | ThumbnailError::InvalidOption(_) => LogLevel::Debug,
            ThumbnailError::SourceUnreadable { .. } => LogLevel::Warn,
            ThumbnailError::Configuration(_)
            | ThumbnailError::MissingMask(_)
            | ThumbnailError::Transform(_)
            | ThumbnailError::Encode(_)
            | ThumbnailError::Storage(_)
            | ThumbnailError::Cache(_)
            | ThumbnailError::Internal(_) => LogLevel::Error,
        }
    }

    /// Whether the orchestrator degrades gracefully instead of propagating.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ThumbnailError::SourceUnreadable { .. })
    }
}

impl From<io::Error> for ThumbnailError {
    fn from(err: io::Error) -> Self {
        ThumbnailError::Storage(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for ThumbnailError {
    fn from(err: serde_json::Error) -> Self {
        ThumbnailError::Cache(format!("JSON error: {}", err))
    }
}

/// Result type used across seothumb
pub type ThumbnailResult<T> = Result<T, ThumbnailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unreadable_sources_are_recoverable() {
        let unreadable = ThumbnailError::SourceUnreadable {
            name: "a.jpg".into(),
            source: anyhow::anyhow!("truncated"),
        };
        assert!(unreadable.is_recoverable());
        assert_eq!(unreadable.log_level(), LogLevel::Warn);

        let storage = ThumbnailError::Storage("disk full".into());
        assert!(!storage.is_recoverable());
        assert_eq!(storage.log_level(), LogLevel::Error);

        let mask = ThumbnailError::MissingMask(PathBuf::from("masks/round.png"));
        assert!(!mask.is_recoverable());
        assert_eq!(mask.to_string(), "Rounding mask not found: masks/round.png");
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let err: ThumbnailError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert!(matches!(err, ThumbnailError::Storage(_)));
    }

    #[test]
    fn test_geometry_errors_log_at_debug() {
        assert_eq!(
            ThumbnailError::InvalidGeometry("x".into()).log_level(),
            LogLevel::Debug
        );
    }
}
