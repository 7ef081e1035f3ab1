//! Date extraction for receipts.
//!
//! Dates are returned exactly as printed. No calendar validation is done and
//! day/month order is not disambiguated.

use super::patterns::DATE_PATTERN;
use super::{FieldExtractor, FieldMatch, ReceiptText};

/// Date field extractor.
#[derive(Debug, Clone, Copy)]
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Find every date-shaped token in a piece of text.
    pub fn find_all(&self, text: &str) -> Vec<String> {
        DATE_PATTERN
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = String;

    fn extract(&self, text: &ReceiptText<'_>) -> Option<FieldMatch<String>> {
        let caps = DATE_PATTERN.captures(text.joined())?;
        let date = caps[1].to_string();
        Some(FieldMatch::new(date.clone(), date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(lines: &[&str]) -> Option<String> {
        let text = ReceiptText::new(lines);
        DateExtractor::new().extract(&text).map(|m| m.value)
    }

    #[test]
    fn test_slash_date() {
        assert_eq!(
            extract(&["Store ABC", "12/05/2024", "450"]),
            Some("12/05/2024".to_string())
        );
    }

    #[test]
    fn test_dash_date_with_short_year() {
        assert_eq!(extract(&["Date: 3-7-24"]), Some("3-7-24".to_string()));
    }

    #[test]
    fn test_mixed_separators() {
        assert_eq!(extract(&["Paid 12/05-2024"]), Some("12/05-2024".to_string()));
        assert_eq!(extract(&["3-7/24"]), Some("3-7/24".to_string()));
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(
            extract(&["Printed 01/01/2023", "Bill date 15/08/2024"]),
            Some("01/01/2023".to_string())
        );
    }

    #[test]
    fn test_no_calendar_validation() {
        assert_eq!(extract(&["99/99/99"]), Some("99/99/99".to_string()));
    }

    #[test]
    fn test_year_must_be_two_or_four_digits() {
        assert_eq!(extract(&["12/05/202"]), None);
        assert_eq!(extract(&["12/05/20245"]), None);
    }

    #[test]
    fn test_requires_word_boundaries() {
        assert_eq!(extract(&["INV123/45/6789"]), None);
        assert_eq!(extract(&["Time 10:30", "Table 4"]), None);
    }

    #[test]
    fn test_date_spanning_lines_is_not_joined_into_one() {
        // Lines are joined with a space, so a split date never matches
        assert_eq!(extract(&["12/05/", "2024"]), None);
    }

    #[test]
    fn test_find_all() {
        let extractor = DateExtractor::new();
        assert_eq!(
            extractor.find_all("from 01-02-24 to 28-02-24"),
            vec!["01-02-24".to_string(), "28-02-24".to_string()]
        );
    }
}
