use thiserror::Error;

/// Event logger error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("Session already running")]
    AlreadyRunning,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type for capture operations
pub type CaptureResult<T> = Result<T, CaptureError>;

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        CaptureError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for CaptureError {
    fn from(err: serde_json::Error) -> Self {
        CaptureError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: CaptureError = io.into();
        assert!(matches!(err, CaptureError::Storage(_)));
        assert_eq!(err.to_string(), "Storage error: read-only");
    }
}
