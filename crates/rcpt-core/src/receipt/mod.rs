//! Receipt field extraction module.

mod extractor;
pub mod rules;
mod text;

pub use extractor::{ExtractionResult, ReceiptExtractor};
pub use rules::normalize_amount;
pub use text::ReceiptText;

use lazy_static::lazy_static;

use crate::models::receipt::ExtractedFields;

lazy_static! {
    static ref DEFAULT_EXTRACTOR: ReceiptExtractor = ReceiptExtractor::new();
}

/// Extract fields using the built-in keyword lists.
pub fn extract_fields<S: AsRef<str>>(lines: &[S]) -> ExtractedFields {
    DEFAULT_EXTRACTOR.extract(lines)
}
