//! Best-effort category refinement through a remote categorization service.
//!
//! The service receives `{merchant, description, amount}` and answers
//! `{category, confidence}`. Any failure leaves the locally seeded category in
//! place with a confidence of `0.0`; the extracted merchant, date and amount
//! are never touched.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::receipt::{ExpenseRecord, ExtractedFields, UNKNOWN};

#[cfg(feature = "native")]
pub use http::HttpCategorizer;

/// Request body sent to the categorization service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRequest {
    /// Extracted merchant name.
    pub merchant: String,
    /// Full receipt text, lines joined with spaces.
    pub description: String,
    /// Extracted amount.
    pub amount: Option<u64>,
}

impl CategoryRequest {
    pub fn new<S: AsRef<str>>(fields: &ExtractedFields, lines: &[S]) -> Self {
        let description = lines
            .iter()
            .map(|line| line.as_ref())
            .collect::<Vec<&str>>()
            .join(" ");

        Self {
            merchant: fields.merchant.clone(),
            description,
            amount: fields.amount,
        }
    }
}

/// Successful response body from the categorization service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResponse {
    #[serde(default = "unknown_category")]
    pub category: String,

    #[serde(default)]
    pub confidence: f32,
}

fn unknown_category() -> String {
    UNKNOWN.to_string()
}

/// Outcome of asking the categorization service.
#[derive(Debug, Clone, PartialEq)]
pub enum Refinement {
    /// The service answered; its category replaces the local one.
    Refined { category: String, confidence: f32 },
    /// No answer was available; keep the local category.
    Unavailable,
}

impl Refinement {
    /// Turn extracted fields into the final record.
    pub fn apply(self, mut fields: ExtractedFields) -> ExpenseRecord {
        match self {
            Refinement::Refined {
                category,
                confidence,
            } => {
                fields.category = category;
                ExpenseRecord { fields, confidence }
            }
            Refinement::Unavailable => ExpenseRecord::local(fields),
        }
    }
}

impl From<CategoryResponse> for Refinement {
    fn from(response: CategoryResponse) -> Self {
        Refinement::Refined {
            category: response.category,
            confidence: response.confidence,
        }
    }
}

/// A source of category refinements.
///
/// Implementations never fail: every error is reported as
/// [`Refinement::Unavailable`].
#[async_trait]
pub trait Categorizer: Send + Sync {
    async fn categorize(&self, request: &CategoryRequest) -> Refinement;
}

/// `None` means categorization is switched off.
#[async_trait]
impl<C: Categorizer> Categorizer for Option<C> {
    async fn categorize(&self, request: &CategoryRequest) -> Refinement {
        match self {
            Some(inner) => inner.categorize(request).await,
            None => Refinement::Unavailable,
        }
    }
}

/// Ask the categorizer about freshly extracted fields and build the final
/// record.
pub async fn enrich<C, S>(categorizer: &C, fields: ExtractedFields, lines: &[S]) -> ExpenseRecord
where
    C: Categorizer + ?Sized,
    S: AsRef<str>,
{
    let request = CategoryRequest::new(&fields, lines);
    let refinement = categorizer.categorize(&request).await;
    debug!("Category refinement: {:?}", refinement);
    refinement.apply(fields)
}

#[cfg(feature = "native")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use tracing::{info, warn};

    use crate::error::CategorizeError;
    use crate::models::config::CategorizerConfig;

    use super::{CategoryRequest, CategoryResponse, Categorizer, Refinement};

    /// Categorizer backed by an HTTP JSON endpoint.
    ///
    /// One attempt per receipt, bounded by the configured timeout.
    #[derive(Debug, Clone)]
    pub struct HttpCategorizer {
        client: reqwest::Client,
        url: String,
    }

    impl HttpCategorizer {
        pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CategorizeError> {
            let client = reqwest::Client::builder()
                .user_agent(concat!("rcpt/", env!("CARGO_PKG_VERSION")))
                .timeout(timeout)
                .build()
                .map_err(|e| CategorizeError::Transport(e.to_string()))?;

            Ok(Self {
                client,
                url: url.into(),
            })
        }

        /// Build from config, `None` when categorization is disabled.
        pub fn from_config(config: &CategorizerConfig) -> Result<Option<Self>, CategorizeError> {
            if !config.enabled {
                return Ok(None);
            }
            Self::new(config.url.clone(), Duration::from_secs(config.timeout_secs)).map(Some)
        }

        pub fn url(&self) -> &str {
            &self.url
        }

        /// Send one request and decode the answer.
        pub async fn request(
            &self,
            request: &CategoryRequest,
        ) -> Result<CategoryResponse, CategorizeError> {
            let response = self
                .client
                .post(&self.url)
                .json(request)
                .send()
                .await
                .map_err(|e| CategorizeError::Transport(e.to_string()))?;

            if !response.status().is_success() {
                return Err(CategorizeError::Status(response.status().as_u16()));
            }

            response
                .json::<CategoryResponse>()
                .await
                .map_err(|e| CategorizeError::Decode(e.to_string()))
        }
    }

    #[async_trait]
    impl Categorizer for HttpCategorizer {
        async fn categorize(&self, request: &CategoryRequest) -> Refinement {
            match self.request(request).await {
                Ok(response) => {
                    info!(
                        "Categorized {:?} as {:?} ({:.2})",
                        request.merchant, response.category, response.confidence
                    );
                    response.into()
                }
                Err(e) => {
                    warn!("Categorization service unavailable at {}: {}", self.url, e);
                    Refinement::Unavailable
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct FixedCategorizer(Refinement);

    #[async_trait]
    impl Categorizer for FixedCategorizer {
        async fn categorize(&self, _request: &CategoryRequest) -> Refinement {
            self.0.clone()
        }
    }

    fn hospital_fields() -> ExtractedFields {
        ExtractedFields {
            merchant: "City Hospital".to_string(),
            date: "12/05/2024".to_string(),
            amount: Some(200),
            category: "Healthcare".to_string(),
        }
    }

    #[test]
    fn test_request_joins_lines() {
        let lines = ["City Hospital", "Total", "2200"];
        let request = CategoryRequest::new(&hospital_fields(), &lines);

        assert_eq!(request.merchant, "City Hospital");
        assert_eq!(request.description, "City Hospital Total 2200");
        assert_eq!(request.amount, Some(200));
    }

    #[test]
    fn test_request_serializes_null_amount() {
        let mut fields = hospital_fields();
        fields.amount = None;
        let request = CategoryRequest::new(&fields, &["x"]);

        let json = serde_json::to_value(&request).unwrap();
        assert!(json["amount"].is_null());
    }

    #[test]
    fn test_response_defaults() {
        let response: CategoryResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.category, "Unknown");
        assert_eq!(response.confidence, 0.0);

        let response: CategoryResponse =
            serde_json::from_str(r#"{"category": "Food", "confidence": 1}"#).unwrap();
        assert_eq!(response.category, "Food");
        assert_eq!(response.confidence, 1.0);
    }

    #[test]
    fn test_unavailable_keeps_local_category() {
        let record = Refinement::Unavailable.apply(hospital_fields());
        assert_eq!(record.fields, hospital_fields());
        assert_eq!(record.confidence, 0.0);
    }

    #[test]
    fn test_refined_replaces_only_category() {
        let record = Refinement::Refined {
            category: "Medical".to_string(),
            confidence: 0.87,
        }
        .apply(hospital_fields());

        assert_eq!(record.fields.category, "Medical");
        assert_eq!(record.fields.merchant, "City Hospital");
        assert_eq!(record.fields.amount, Some(200));
        assert_eq!(record.confidence, 0.87);
    }

    #[tokio::test]
    async fn test_enrich_with_categorizer() {
        let categorizer = FixedCategorizer(Refinement::Refined {
            category: "Food".to_string(),
            confidence: 0.9,
        });
        let record = enrich(&categorizer, hospital_fields(), &["City Hospital"]).await;

        assert_eq!(record.fields.category, "Food");
        assert_eq!(record.confidence, 0.9);
    }

    #[tokio::test]
    async fn test_enrich_without_categorizer() {
        let disabled: Option<FixedCategorizer> = None;
        let record = enrich(&disabled, hospital_fields(), &["City Hospital"]).await;

        assert_eq!(record, ExpenseRecord::local(hospital_fields()));
    }

    #[cfg(feature = "native")]
    #[tokio::test]
    async fn test_unreachable_service_is_unavailable() {
        // Nothing listens on the discard port
        let categorizer =
            HttpCategorizer::new("http://127.0.0.1:9/categorize", std::time::Duration::from_secs(2))
                .unwrap();
        let request = CategoryRequest::new(&hospital_fields(), &["City Hospital"]);

        assert_eq!(categorizer.categorize(&request).await, Refinement::Unavailable);
    }

    #[cfg(feature = "native")]
    #[test]
    fn test_disabled_config_builds_nothing() {
        let config = crate::models::config::CategorizerConfig::default();
        assert!(HttpCategorizer::from_config(&config).unwrap().is_none());
    }
}
