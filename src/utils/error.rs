//! Error types for the image compressor.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use thiserror::Error;
use serde::Serialize;

/// Intake and settings validation errors.
///
/// These are the "user-facing" rejections: the event surface turns them into
/// an alert instead of a log line.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum ValidationError {
    /// Declared type does not start with `image/`
    #[error("{name} is not an image (type: {mime_type})")]
    NotAnImage { name: String, mime_type: String },
    /// File is bigger than the intake ceiling
    #[error("{name} is too large ({size} bytes, limit is {limit} bytes)")]
    TooLarge { name: String, size: u64, limit: u64 },
    /// Invalid settings value
    #[error("Settings error: {0}")]
    Settings(String),
}

/// Main error type for the compressor.
#[derive(Error, Debug, Clone, Serialize)]
pub enum CompressorError {
    /// Intake or settings validation failed
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Positional access past the end of a file list
    #[error("No file at index {index} (list holds {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Encoding or decoding failed
    #[error("Compression error: {0}")]
    Compression(String),

    /// Unsupported or invalid image format
    #[error("Format error: {0}")]
    Format(String),

    /// Zip bundling failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// File IO error
    #[error("IO error: {0}")]
    IO(String),
}

/// Convenience result type for compressor operations.
pub type CompressorResult<T> = Result<T, CompressorError>;

impl CompressorError {
    pub fn compression<T: Into<String>>(msg: T) -> Self {
        Self::Compression(msg.into())
    }

    pub fn format<T: Into<String>>(msg: T) -> Self {
        Self::Format(msg.into())
    }

    pub fn archive<T: Into<String>>(msg: T) -> Self {
        Self::Archive(msg.into())
    }

    pub fn io<T: Into<String>>(msg: T) -> Self {
        Self::IO(msg.into())
    }

    /// True for rejections the user should see directly.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl ValidationError {
    pub fn not_an_image(name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self::NotAnImage {
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn too_large(name: impl Into<String>, size: u64, limit: u64) -> Self {
        Self::TooLarge {
            name: name.into(),
            size,
            limit,
        }
    }

    pub fn settings(msg: impl Into<String>) -> Self {
        Self::Settings(msg.into())
    }
}

// Convert std::io::Error to CompressorError
impl From<io::Error> for CompressorError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<image::ImageError> for CompressorError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Unsupported(e) => Self::Format(e.to_string()),
            other => Self::Compression(other.to_string()),
        }
    }
}

impl From<zip::result::ZipError> for CompressorError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Archive(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CompressorError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Compression(format!("Task panicked: {err}"))
    }
}
