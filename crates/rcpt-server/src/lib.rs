//! HTTP API for receipt OCR expense extraction.
//!
//! Routes:
//! - `POST /ocr`: multipart upload (`file`) → OCR → extraction → refinement
//! - `POST /extract`: JSON `{lines}` → extraction → refinement
//! - `GET /health`

mod handlers;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use rcpt_core::models::config::ServerConfig;
use rcpt_core::{enrich, ExpenseRecord, HttpCategorizer, LineRecognizer, ReceiptExtractor};

/// Shared application state
pub struct AppState {
    pub extractor: ReceiptExtractor,
    /// `None` when no OCR models could be loaded; `/ocr` then answers 503.
    pub recognizer: Option<Arc<dyn LineRecognizer>>,
    /// `None` when remote categorization is disabled.
    pub categorizer: Option<HttpCategorizer>,
}

impl AppState {
    pub fn new(extractor: ReceiptExtractor) -> Self {
        Self {
            extractor,
            recognizer: None,
            categorizer: None,
        }
    }

    pub fn with_recognizer(mut self, recognizer: Arc<dyn LineRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    pub fn with_categorizer(mut self, categorizer: Option<HttpCategorizer>) -> Self {
        self.categorizer = categorizer;
        self
    }

    /// Extract, refine and wrap the record for one receipt.
    pub async fn process_lines(&self, lines: Vec<String>) -> ReceiptResponse {
        let fields = self.extractor.extract(&lines);
        let record = enrich(&self.categorizer, fields, &lines).await;

        ReceiptResponse {
            success: true,
            extracted_data: record,
            raw_text: lines,
        }
    }
}

/// Response for a processed receipt
#[derive(Debug, Serialize, Deserialize)]
pub struct ReceiptResponse {
    pub success: bool,
    pub extracted_data: ExpenseRecord,
    pub raw_text: Vec<String>,
}

/// Build the API router
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ocr", post(handlers::receipts::process_receipt))
        .route("/extract", post(handlers::receipts::extract_lines))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Start the server
pub async fn serve(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    if state.recognizer.is_none() {
        warn!("No OCR engine loaded, POST /ocr will answer 503");
    }
    match &state.categorizer {
        Some(categorizer) => info!("Refining categories via {}", categorizer.url()),
        None => info!("Remote categorization disabled"),
    }

    let app = create_router(state, config);
    let addr = format!("{}:{}", config.host, config.port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn unavailable(msg: &str) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            internal: Some(err.into()),
        }
    }
}
