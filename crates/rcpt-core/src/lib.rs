//! Core library for receipt OCR expense extraction.
//!
//! This crate provides:
//! - Receipt field extraction (merchant, date, total amount, local category)
//! - An OCR adapter turning receipt images into text lines
//! - Best-effort category refinement through a remote service
//! - Receipt data models and pipeline configuration

pub mod categorize;
pub mod error;
pub mod models;
pub mod ocr;
pub mod receipt;

pub use categorize::{enrich, CategoryRequest, CategoryResponse, Categorizer, Refinement};
#[cfg(feature = "native")]
pub use categorize::HttpCategorizer;
pub use error::{CategorizeError, OcrError, RcptError, Result};
pub use models::config::RcptConfig;
pub use models::receipt::{ExpenseRecord, ExtractedFields};
pub use ocr::{load_image, LineRecognizer, OcrResult, TextBox};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use receipt::{extract_fields, normalize_amount, ExtractionResult, ReceiptExtractor};
