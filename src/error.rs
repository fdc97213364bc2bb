//! # Error Types
//!
//! Custom error types for Extreme Link using `thiserror`.

use std::time::Duration;
use thiserror::Error;

/// Main error type for Extreme Link
#[derive(Debug, Error)]
pub enum LinkError {
    /// Bluetooth controller was not idle when initialization started
    #[error("Bluetooth controller busy, skipping init")]
    ControllerBusy,

    /// The GATT lock could not be acquired within the bounded wait
    #[error("Timed out acquiring GATT lock after {0:?}")]
    LockTimeout(Duration),

    /// The underlying GATT stack rejected an operation
    #[error("GATT stack error: {0}")]
    Stack(String),

    /// Binary payload with an unexpected shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Extreme Link
pub type Result<T> = std::result::Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_timeout_message() {
        let err = LinkError::LockTimeout(Duration::from_millis(10));
        assert_eq!(err.to_string(), "Timed out acquiring GATT lock after 10ms");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: LinkError = io.into();
        assert!(matches!(err, LinkError::Io(_)));
    }
}
