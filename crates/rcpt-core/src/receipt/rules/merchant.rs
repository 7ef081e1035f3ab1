//! Merchant extraction.

use super::{FieldExtractor, FieldMatch, ReceiptText};

/// How the merchant name was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MerchantSource {
    /// A configured keyword appeared on a line.
    Keyword,
    /// No keyword matched; the top line of the receipt was used.
    FirstLine,
}

/// Merchant field extractor.
///
/// Keywords are matched case-insensitively as substrings. Lines are scanned
/// in order and, per line, keywords in their configured order; the first hit
/// returns the keyword as configured, not the line text.
#[derive(Debug, Clone)]
pub struct MerchantExtractor {
    /// (configured spelling, lowercase form)
    keywords: Vec<(String, String)>,
}

impl MerchantExtractor {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| -> String { k.into() })
            // An empty keyword would match every line
            .filter(|k| !k.trim().is_empty())
            .map(|k| {
                let lower = k.to_lowercase();
                (k, lower)
            })
            .collect();

        Self { keywords }
    }

    /// Configured keywords in match order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|(k, _)| k.as_str())
    }

    fn find_keyword(&self, text: &ReceiptText<'_>) -> Option<FieldMatch<String>> {
        for (index, line) in text.lines().iter().enumerate() {
            let lower = line.to_lowercase();
            for (keyword, keyword_lower) in &self.keywords {
                if lower.contains(keyword_lower.as_str()) {
                    return Some(FieldMatch::new(keyword.clone(), *line).at_line(index));
                }
            }
        }
        None
    }

    /// Extract the merchant and report how it was chosen.
    pub fn extract_with_source(
        &self,
        text: &ReceiptText<'_>,
    ) -> Option<(FieldMatch<String>, MerchantSource)> {
        if let Some(found) = self.find_keyword(text) {
            return Some((found, MerchantSource::Keyword));
        }

        text.first_line().map(|line| {
            (
                FieldMatch::new(line.to_string(), line).at_line(0),
                MerchantSource::FirstLine,
            )
        })
    }
}

impl FieldExtractor for MerchantExtractor {
    type Output = String;

    fn extract(&self, text: &ReceiptText<'_>) -> Option<FieldMatch<String>> {
        self.extract_with_source(text).map(|(found, _)| found)
    }
}
