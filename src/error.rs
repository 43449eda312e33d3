//! Error types for the e-ink canvas client

use thiserror::Error;

/// Result type alias for canvas operations
pub type Result<T> = std::result::Result<T, CanvasError>;

/// Main error type for the canvas client
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Device protocol error: {0}")]
    Protocol(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Media source error: {0}")]
    Media(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CanvasError {
    /// Check if error is retryable.
    ///
    /// Only transport-level failures (timeout, connection refused/reset)
    /// qualify. A non-200 status or a malformed body is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            CanvasError::Http(err) => err.is_timeout() || err.is_connect() || err.is_request(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_transport_errors_are_terminal() {
        assert!(!CanvasError::Protocol("bad body".into()).is_retryable());
        assert!(!CanvasError::InvalidInput("no source".into()).is_retryable());
        assert!(!CanvasError::Upload("rejected".into()).is_retryable());
        assert!(!CanvasError::Media("gone".into()).is_retryable());
    }
}
