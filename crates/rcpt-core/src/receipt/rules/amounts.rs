//! Total amount extraction.

use tracing::debug;

use super::patterns::{CURRENCY_SYMBOL, DIGIT_RUN, THOUSANDS_SEPARATOR, TOTAL_LABEL};
use super::{FieldExtractor, FieldMatch, ReceiptText};

/// Where an amount was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountSource {
    /// The line right after the first line mentioning "total".
    TotalLabel,
    /// The last run of digits anywhere on the receipt.
    LastNumber,
}

/// Amount field extractor.
///
/// Looks for the line following the first "total" label, then falls back to
/// the last number printed on the receipt.
#[derive(Debug, Clone, Copy)]
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }

    fn from_total_label(&self, text: &ReceiptText<'_>) -> Option<FieldMatch<u64>> {
        let lines = text.lines();
        let label = lines
            .iter()
            .position(|line| line.to_lowercase().contains(TOTAL_LABEL))?;

        // Only the first label counts, even if its value line is unreadable
        let value_line = label + 1;
        let raw: &str = lines.get(value_line)?;
        let amount = normalize_amount(Some(raw))?;

        Some(FieldMatch::new(amount, raw).at_line(value_line))
    }

    fn from_last_number(&self, text: &ReceiptText<'_>) -> Option<FieldMatch<u64>> {
        let last = DIGIT_RUN.find_iter(text.joined()).last()?;
        let amount = normalize_amount(Some(last.as_str()))?;

        Some(FieldMatch::new(amount, last.as_str()))
    }

    /// Extract the amount and report which tier produced it.
    pub fn extract_with_source(
        &self,
        text: &ReceiptText<'_>,
    ) -> Option<(FieldMatch<u64>, AmountSource)> {
        if let Some(found) = self.from_total_label(text) {
            return Some((found, AmountSource::TotalLabel));
        }

        debug!("No usable total label, falling back to last number");
        self.from_last_number(text)
            .map(|found| (found, AmountSource::LastNumber))
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = u64;

    fn extract(&self, text: &ReceiptText<'_>) -> Option<FieldMatch<u64>> {
        self.extract_with_source(text).map(|(found, _)| found)
    }
}

/// Normalize a raw amount token into whole currency units.
///
/// Strips the rupee sign and thousands separators, keeps only ASCII digits
/// and parses what is left. A 4-digit result loses its first digit: OCR
/// tends to read the currency glyph on 3-digit totals as a leading digit.
/// Values too large for `u64` are treated as unreadable.
pub fn normalize_amount(raw: Option<&str>) -> Option<u64> {
    let raw = raw?;

    let stripped = raw
        .replace(CURRENCY_SYMBOL, "")
        .replace(THOUSANDS_SEPARATOR, "");
    let digits: String = stripped
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return None;
    }

    let significant = if digits.len() == 4 {
        &digits[1..]
    } else {
        digits.as_str()
    };

    match significant.parse() {
        Ok(amount) => Some(amount),
        Err(e) => {
            debug!("Discarding amount {:?}: {}", significant, e);
            None
        }
    }
}
