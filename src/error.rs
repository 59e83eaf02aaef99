// SwimPose Tools 🏊 AGPL-3.0 License

//! Error types for the dataset toolkit.

use std::fmt;

/// Result type alias for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

/// Main error type for the dataset toolkit.
#[derive(Debug)]
pub enum DatasetError {
    /// The source image cannot be decoded or does not exist.
    ImageRead(String),
    /// No label file exists for a given image.
    AnnotationMissing(String),
    /// A label line cannot be parsed (too few fields, bad number, ragged keypoint tail).
    MalformedAnnotation(String),
    /// Invalid configuration rejected before any processing begins.
    Config(String),
    /// IO error with context (file not found, permission denied, etc.).
    IoError(String),
    /// Wrapped `std::io::Error`.
    Io(std::io::Error),
    /// JSON serialization/deserialization error.
    Json(String),
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageRead(msg) => write!(f, "Image read error: {msg}"),
            Self::AnnotationMissing(msg) => write!(f, "Annotation missing: {msg}"),
            Self::MalformedAnnotation(msg) => write!(f, "Malformed annotation: {msg}"),
            Self::Config(msg) => write!(f, "Config error: {msg}"),
            Self::IoError(msg) => write!(f, "IO error: {msg}"),
            Self::Io(err) => write!(f, "IO error: {err}"),
            Self::Json(msg) => write!(f, "JSON error: {msg}"),
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for DatasetError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageRead(err.to_string())
    }
}

impl From<serde_json::Error> for DatasetError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DatasetError::ImageRead("test".to_string());
        assert_eq!(err.to_string(), "Image read error: test");

        let err = DatasetError::Config("angle must be a multiple of 90".to_string());
        assert_eq!(
            err.to_string(),
            "Config error: angle must be a multiple of 90"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: DatasetError = io.into();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
