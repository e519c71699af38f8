//! Error types for the new-tab core
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to the frontend.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not enough storage space: need {required} bytes, {available} bytes left")]
    QuotaExceeded { required: u64, available: u64 },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serializes_as_message() {
        let err = AppError::QuotaExceeded {
            required: 2048,
            available: 1024,
        };

        let json = serde_json::to_string(&err).unwrap();

        assert_eq!(
            json,
            "\"Not enough storage space: need 2048 bytes, 1024 bytes left\""
        );
    }
}
