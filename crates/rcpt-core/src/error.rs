//! Error types for the rcpt-core library.
//!
//! Field extraction itself is total and has no error type; everything here
//! belongs to the glue around it (OCR, the categorization service, config).

use thiserror::Error;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Remote categorization error.
    #[error("categorization error: {0}")]
    Categorize(#[from] CategorizeError),

    /// Image decoding error.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Text detection or recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors talking to the remote categorization service.
///
/// These never reach callers of [`crate::categorize::Categorizer`]; they are
/// logged and collapsed into [`crate::categorize::Refinement::Unavailable`].
#[derive(Error, Debug)]
pub enum CategorizeError {
    /// Connection, timeout or other transport failure.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// The response body was not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
