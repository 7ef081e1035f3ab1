//! OCR adapter producing receipt lines from an image.
//!
//! The recognition model is a black box behind [`LineRecognizer`]; the
//! extraction engine only ever sees the resulting lines.

#[cfg(feature = "native")]
mod pure_engine;

#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Decode an uploaded or on-disk receipt image.
pub fn load_image(bytes: &[u8]) -> crate::Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(OcrError::InvalidImage("empty image data".to_string()).into());
    }
    Ok(image::load_from_memory(bytes)?)
}

/// Height of a reading-order row in pixels.
const ROW_HEIGHT: f32 = 20.0;

/// Anything that can turn a receipt image into ordered text lines.
pub trait LineRecognizer: Send + Sync {
    /// Recognize the text regions of an image, top to bottom.
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError>;

    /// Convenience: recognized lines only.
    fn recognize_lines(&self, image: &DynamicImage) -> Result<Vec<String>, OcrError> {
        Ok(self.recognize(image)?.lines())
    }
}

/// A detected text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub score: f32,
}

impl TextBox {
    /// Get the axis-aligned bounding rectangle.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on an image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Create an empty result.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            boxes: Vec::new(),
            processing_time_ms: 0,
            image_size: (width, height),
        }
    }

    /// Box texts in reading order, exactly as recognized.
    ///
    /// Blank and padded texts are kept: line positions matter to extraction.
    pub fn lines(&self) -> Vec<String> {
        self.boxes.iter().map(|b| b.text.clone()).collect()
    }

    /// Sort boxes by reading order (top-to-bottom, left-to-right).
    pub fn sort_by_reading_order(&mut self) {
        self.boxes.sort_by(|a, b| {
            let (ax, ay, _, _) = a.rect();
            let (bx, by, _, _) = b.rect();

            // Group by approximate vertical position
            let row_a = (ay / ROW_HEIGHT) as i32;
            let row_b = (by / ROW_HEIGHT) as i32;

            if row_a != row_b {
                row_a.cmp(&row_b)
            } else {
                ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            text: text.to_string(),
            score: 0.9,
        }
    }

    #[test]
    fn test_reading_order() {
        let mut result = OcrResult::empty(200, 200);
        result.boxes = vec![
            text_box(10.0, 100.0, "Total"),
            text_box(120.0, 5.0, "Outlet"),
            text_box(10.0, 2.0, "Dominos"),
            text_box(10.0, 140.0, "8415"),
        ];

        result.sort_by_reading_order();
        assert_eq!(result.lines(), vec!["Dominos", "Outlet", "Total", "8415"]);
    }

    #[test]
    fn test_lines_keep_box_text_verbatim() {
        let mut result = OcrResult::empty(100, 100);
        result.boxes = vec![
            text_box(0.0, 0.0, "  CCD "),
            text_box(0.0, 30.0, "   "),
            text_box(0.0, 60.0, "180"),
        ];

        assert_eq!(result.lines(), vec!["  CCD ", "   ", "180"]);
    }

    #[test]
    fn test_blank_box_stays_after_total() {
        let mut result = OcrResult::empty(100, 100);
        result.boxes = vec![
            text_box(0.0, 0.0, "Total"),
            text_box(0.0, 30.0, ""),
            text_box(0.0, 60.0, "5 items"),
            text_box(0.0, 90.0, "2450"),
        ];

        let lines = result.lines();
        assert_eq!(lines.len(), 4);
        // The blank line after the label has no digits, so the last number wins
        assert_eq!(crate::extract_fields(&lines).amount, Some(450));
    }

    struct CannedRecognizer;

    impl LineRecognizer for CannedRecognizer {
        fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError> {
            let mut result = OcrResult::empty(image.width(), image.height());
            result.boxes.push(text_box(0.0, 0.0, "City Hospital"));
            Ok(result)
        }
    }

    #[test]
    fn test_load_image_rejects_garbage() {
        assert!(matches!(
            load_image(b""),
            Err(crate::RcptError::Ocr(OcrError::InvalidImage(_)))
        ));
        assert!(matches!(
            load_image(b"definitely not a png"),
            Err(crate::RcptError::Image(_))
        ));
    }

    #[test]
    fn test_recognize_lines_default() {
        let image = DynamicImage::new_rgb8(8, 8);
        let lines = CannedRecognizer.recognize_lines(&image).unwrap();
        assert_eq!(lines, vec!["City Hospital"]);
    }
}
