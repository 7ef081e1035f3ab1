//! Rule-based field extractors for receipts.

pub mod amounts;
pub mod category;
pub mod dates;
pub mod merchant;
pub mod patterns;

pub use amounts::{normalize_amount, AmountExtractor, AmountSource};
pub use category::CategoryClassifier;
pub use dates::DateExtractor;
pub use merchant::{MerchantExtractor, MerchantSource};
pub use patterns::*;

use super::text::ReceiptText;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from the receipt lines.
    fn extract(&self, text: &ReceiptText<'_>) -> Option<FieldMatch<Self::Output>>;
}

/// An extracted value together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Source text that was matched.
    pub source: String,
    /// Index of the line the value was read from, when the rule is
    /// line-oriented.
    pub line: Option<usize>,
}

impl<T> FieldMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            source: source.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FieldMatch<U> {
        FieldMatch {
            value: f(self.value),
            source: self.source,
            line: self.line,
        }
    }
}
