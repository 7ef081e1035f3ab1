//! Receipt handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use rcpt_core::load_image;

use crate::{AppError, AppState, ReceiptResponse};

/// POST /ocr - Extract an expense record from an uploaded receipt image
///
/// Expects multipart form with:
/// - file: receipt image (required)
pub async fn process_receipt(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<ReceiptResponse>, AppError> {
    let recognizer = state
        .recognizer
        .clone()
        .ok_or_else(|| AppError::unavailable("OCR engine is not loaded"))?;

    let mut file_data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() == Some("file") {
            let bytes = field
                .bytes()
                .await
                .map_err(|_| AppError::bad_request("Failed to read file data"))?;
            file_data = Some(bytes);
        }
    }

    let file_data = file_data.ok_or_else(|| AppError::bad_request("Missing file field"))?;
    let image = load_image(&file_data)
        .map_err(|e| AppError::bad_request(&format!("Unreadable image: {}", e)))?;

    // OCR is CPU bound; keep it off the async workers
    let lines = tokio::task::spawn_blocking(move || recognizer.recognize_lines(&image))
        .await?
        .map_err(|e| AppError::internal(&format!("OCR failed: {}", e)))?;

    for (i, line) in lines.iter().enumerate() {
        debug!("OCR line {} => {}", i, line);
    }

    Ok(Json(state.process_lines(lines).await))
}

/// Request body for line extraction
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub lines: Vec<String>,
}

/// POST /extract - Extract an expense record from already recognized lines
pub async fn extract_lines(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExtractRequest>,
) -> Json<ReceiptResponse> {
    Json(state.process_lines(request.lines).await)
}
