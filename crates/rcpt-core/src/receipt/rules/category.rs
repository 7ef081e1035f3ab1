//! Local spending category rules.

use crate::models::config::CategoryRule;
use crate::models::receipt::CATEGORY_GENERAL;

use super::{FieldExtractor, FieldMatch, ReceiptText};

/// Keyword based category classifier.
///
/// Each rule is a case-insensitive substring test against the whole receipt
/// text; the first matching rule decides. The result only seeds the category,
/// the remote categorizer may replace it.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    /// (lowercase keyword, category)
    rules: Vec<(String, String)>,
    fallback: String,
}

impl CategoryClassifier {
    pub fn new(rules: &[CategoryRule]) -> Self {
        let rules = rules
            .iter()
            .filter(|r| !r.keyword.trim().is_empty())
            .map(|r| (r.keyword.to_lowercase(), r.category.clone()))
            .collect();

        Self {
            rules,
            fallback: CATEGORY_GENERAL.to_string(),
        }
    }

    /// Category used when no rule matches.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Classify, falling back to the default category.
    pub fn classify(&self, text: &ReceiptText<'_>) -> String {
        self.extract(text)
            .map(|found| found.value)
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl FieldExtractor for CategoryClassifier {
    type Output = String;

    fn extract(&self, text: &ReceiptText<'_>) -> Option<FieldMatch<String>> {
        let haystack = text.joined().to_lowercase();

        self.rules
            .iter()
            .find(|(keyword, _)| haystack.contains(keyword.as_str()))
            .map(|(keyword, category)| FieldMatch::new(category.clone(), keyword.as_str()))
    }
}
