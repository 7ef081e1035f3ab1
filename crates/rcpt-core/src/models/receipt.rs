//! Receipt data models.

use serde::{Deserialize, Serialize};

/// Placeholder for a text field that could not be found.
pub const UNKNOWN: &str = "Unknown";

/// Local category for medical spending.
pub const CATEGORY_HEALTHCARE: &str = "Healthcare";

/// Local category used when no category rule matches.
pub const CATEGORY_GENERAL: &str = "General";

/// Fields derived from the OCR lines of one receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    /// Merchant keyword, first line of the receipt, or `"Unknown"`.
    pub merchant: String,

    /// Date substring exactly as printed, or `"Unknown"`.
    pub date: String,

    /// Whole-unit total amount.
    pub amount: Option<u64>,

    /// Locally seeded spending category.
    pub category: String,
}

impl Default for ExtractedFields {
    fn default() -> Self {
        Self {
            merchant: UNKNOWN.to_string(),
            date: UNKNOWN.to_string(),
            amount: None,
            category: CATEGORY_GENERAL.to_string(),
        }
    }
}

impl ExtractedFields {
    /// Whether a merchant other than the placeholder was found.
    pub fn has_merchant(&self) -> bool {
        self.merchant != UNKNOWN
    }

    /// Whether a date was found.
    pub fn has_date(&self) -> bool {
        self.date != UNKNOWN
    }
}

/// The final expense record: extracted fields plus the categorizer's
/// confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(flatten)]
    pub fields: ExtractedFields,

    /// Confidence reported by the categorization service, `0.0` when the
    /// service was skipped or unavailable.
    pub confidence: f32,
}

impl ExpenseRecord {
    /// Record carrying the local category and no confidence.
    pub fn local(fields: ExtractedFields) -> Self {
        Self {
            fields,
            confidence: 0.0,
        }
    }
}

impl From<ExtractedFields> for ExpenseRecord {
    fn from(fields: ExtractedFields) -> Self {
        Self::local(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_fields_use_placeholders() {
        let fields = ExtractedFields::default();
        assert_eq!(fields.merchant, "Unknown");
        assert_eq!(fields.date, "Unknown");
        assert_eq!(fields.amount, None);
        assert_eq!(fields.category, "General");
        assert!(!fields.has_merchant());
        assert!(!fields.has_date());
    }

    #[test]
    fn test_expense_record_serializes_flat() {
        let record = ExpenseRecord::local(ExtractedFields {
            merchant: "CCD".to_string(),
            date: "01-02-24".to_string(),
            amount: Some(180),
            category: "General".to_string(),
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "merchant": "CCD",
                "date": "01-02-24",
                "amount": 180,
                "category": "General",
                "confidence": 0.0
            })
        );
    }

    #[test]
    fn test_missing_amount_serializes_as_null() {
        let record = ExpenseRecord::from(ExtractedFields::default());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["amount"].is_null());
    }
}
