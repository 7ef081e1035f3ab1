//! Receipt field extractor combining the per-field rules.

use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::receipt::{ExtractedFields, UNKNOWN};

use super::rules::{
    AmountExtractor, AmountSource, CategoryClassifier, DateExtractor, FieldExtractor,
    MerchantExtractor, MerchantSource,
};
use super::text::ReceiptText;

/// Result of receipt extraction with provenance for each field.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Extracted fields.
    pub fields: ExtractedFields,
    /// How the merchant was chosen, `None` for an empty receipt.
    pub merchant_source: Option<MerchantSource>,
    /// Which rule produced the amount.
    pub amount_source: Option<AmountSource>,
    /// Extraction warnings.
    pub warnings: Vec<String>,
}

/// Rule-based receipt extractor.
///
/// Holds only immutable keyword data, so one instance can be shared across
/// threads and reused for any number of receipts.
#[derive(Debug, Clone)]
pub struct ReceiptExtractor {
    merchants: MerchantExtractor,
    dates: DateExtractor,
    amounts: AmountExtractor,
    categories: CategoryClassifier,
}

impl ReceiptExtractor {
    /// Create an extractor with the built-in keyword lists.
    pub fn new() -> Self {
        Self::with_config(&ExtractionConfig::default())
    }

    /// Create an extractor from configured keyword lists.
    pub fn with_config(config: &ExtractionConfig) -> Self {
        Self {
            merchants: MerchantExtractor::new(config.merchant_keywords.iter().cloned()),
            dates: DateExtractor::new(),
            amounts: AmountExtractor::new(),
            categories: CategoryClassifier::new(&config.category_rules),
        }
    }

    /// Extract merchant, date, amount and local category from OCR lines.
    pub fn extract<S: AsRef<str>>(&self, lines: &[S]) -> ExtractedFields {
        self.parse(lines).fields
    }

    /// Extract fields and keep track of which rule produced each of them.
    pub fn parse<S: AsRef<str>>(&self, lines: &[S]) -> ExtractionResult {
        let text = ReceiptText::new(lines);
        let mut warnings = Vec::new();

        if text.is_empty() {
            warnings.push("No text lines to extract from".to_string());
        }

        // Merchant
        let (merchant, merchant_source) = match self.merchants.extract_with_source(&text) {
            Some((found, source)) => {
                debug!("Merchant {:?} ({:?}) from line {:?}", found.value, source, found.line);
                if source == MerchantSource::FirstLine {
                    warnings.push("No known merchant found, using first line".to_string());
                }
                (found.value, Some(source))
            }
            None => (UNKNOWN.to_string(), None),
        };

        // Date
        let date = match self.dates.extract(&text) {
            Some(found) => found.value,
            None => {
                if !text.is_empty() {
                    warnings.push("No date found".to_string());
                }
                UNKNOWN.to_string()
            }
        };

        // Amount
        let (amount, amount_source) = match self.amounts.extract_with_source(&text) {
            Some((found, source)) => {
                debug!("Amount {} ({:?}) from {:?}", found.value, source, found.source);
                if source == AmountSource::LastNumber {
                    warnings.push("No total label found, using last number".to_string());
                }
                (Some(found.value), Some(source))
            }
            None => {
                if !text.is_empty() {
                    warnings.push("No amount found".to_string());
                }
                (None, None)
            }
        };

        // Category
        let category = self.categories.classify(&text);

        ExtractionResult {
            fields: ExtractedFields {
                merchant,
                date,
                amount,
                category,
            },
            merchant_source,
            amount_source,
            warnings,
        }
    }
}

impl Default for ReceiptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::CategoryRule;
    use pretty_assertions::assert_eq;

    fn fields(merchant: &str, date: &str, amount: Option<u64>, category: &str) -> ExtractedFields {
        ExtractedFields {
            merchant: merchant.to_string(),
            date: date.to_string(),
            amount,
            category: category.to_string(),
        }
    }

    #[test]
    fn test_empty_receipt() {
        let extractor = ReceiptExtractor::new();
        let lines: Vec<String> = Vec::new();

        assert_eq!(
            extractor.extract(&lines),
            fields("Unknown", "Unknown", None, "General")
        );
    }

    #[test]
    fn test_known_merchant_with_total_label() {
        let extractor = ReceiptExtractor::new();
        let lines = ["Dominos Pizza Outlet", "Total", "8415", "Thank you"];

        let result = extractor.parse(&lines);
        assert_eq!(result.fields, fields("Dominos", "Unknown", Some(415), "General"));
        assert_eq!(result.merchant_source, Some(MerchantSource::Keyword));
        assert_eq!(result.amount_source, Some(AmountSource::TotalLabel));
        assert!(result.warnings.contains(&"No date found".to_string()));
    }

    #[test]
    fn test_unknown_store_without_total() {
        let extractor = ReceiptExtractor::new();
        let lines = ["Store ABC", "12/05/2024", "Items: 3", "450"];

        let result = extractor.parse(&lines);
        assert_eq!(result.fields, fields("Store ABC", "12/05/2024", Some(450), "General"));
        assert_eq!(result.merchant_source, Some(MerchantSource::FirstLine));
        assert_eq!(result.amount_source, Some(AmountSource::LastNumber));
    }

    #[test]
    fn test_hospital_receipt() {
        let extractor = ReceiptExtractor::new();
        let lines = ["City Hospital", "Total", "2200"];

        let extracted = extractor.extract(&lines);
        assert_eq!(extracted.category, "Healthcare");
        assert_eq!(extracted.merchant, "City Hospital");
        assert_eq!(extracted.amount, Some(200));
    }

    #[test]
    fn test_date_is_taken_before_total_digits() {
        let extractor = ReceiptExtractor::new();
        let lines = ["Haldiram", "Bill 12-1-24", "Net Total", "₹ 356"];

        assert_eq!(
            extractor.extract(&lines),
            fields("Haldiram", "12-1-24", Some(356), "General")
        );
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let extractor = ReceiptExtractor::new();
        let lines = vec![
            "CCD Koramangala".to_string(),
            "05/06/2024".to_string(),
            "Cappuccino 180".to_string(),
            "TOTAL".to_string(),
            "1,180".to_string(),
        ];

        let first = extractor.parse(&lines);
        let second = extractor.parse(&lines);
        assert_eq!(first, second);
        assert_eq!(first.fields.amount, Some(180));
    }

    #[test]
    fn test_unrelated_lines_can_be_reordered() {
        let extractor = ReceiptExtractor::new();
        let original = ["Pizza Hut", "Garlic bread", "Pepsi", "Total", "499"];
        let reordered = ["Pizza Hut", "Pepsi", "Garlic bread", "Total", "499"];

        assert_eq!(extractor.extract(&original), extractor.extract(&reordered));
    }

    #[test]
    fn test_input_lines_are_not_modified() {
        let extractor = ReceiptExtractor::new();
        let lines = vec!["Manipal Clinic".to_string(), "Total".to_string(), "650".to_string()];
        let before = lines.clone();

        let _ = extractor.extract(&lines);
        assert_eq!(lines, before);
    }

    #[test]
    fn test_custom_config() {
        let config = ExtractionConfig {
            merchant_keywords: vec!["Corner Deli".to_string()],
            category_rules: vec![CategoryRule::new("deli", "Food")],
        };
        let extractor = ReceiptExtractor::with_config(&config);

        let extracted = extractor.extract(&["Dominos", "THE CORNER DELI", "total", "95"]);
        assert_eq!(extracted, fields("Corner Deli", "Unknown", Some(95), "Food"));
    }
}
