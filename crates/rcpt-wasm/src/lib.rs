//! WASM bindings for receipt expense extraction.
//!
//! OCR happens elsewhere (a browser OCR library or the HTTP API); these
//! bindings take the recognized lines and return the extracted fields.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use rcpt_core::models::config::ExtractionConfig;
use rcpt_core::models::receipt::ExtractedFields;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn lines_from_js(lines: JsValue) -> Result<Vec<String>, JsValue> {
    serde_wasm_bindgen::from_value(lines).map_err(to_js_error)
}

/// Convert to a JS value with `u64` amounts as `BigInt`.
///
/// Amounts are unbounded whole numbers; a JS number is only exact up to 2^53.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let serializer =
        serde_wasm_bindgen::Serializer::new().serialize_large_number_types_as_bigints(true);
    value.serialize(&serializer).map_err(to_js_error)
}

/// Extract `{merchant, date, amount, category}` from an array of lines
/// using the built-in keyword lists. `amount` is a `bigint` or `null`.
#[wasm_bindgen]
pub fn extract_fields(lines: JsValue) -> Result<JsValue, JsValue> {
    let lines = lines_from_js(lines)?;
    to_js(&rcpt_core::extract_fields(&lines))
}

/// Normalize a raw amount string (e.g. "₹8,415" gives 415).
#[wasm_bindgen]
pub fn normalize_amount(raw: Option<String>) -> Option<u64> {
    rcpt_core::normalize_amount(raw.as_deref())
}

/// Extraction result with the notes explaining fallbacks.
#[derive(Serialize)]
struct Explained {
    fields: ExtractedFields,
    warnings: Vec<String>,
}

/// Receipt extractor class for browser use.
#[wasm_bindgen]
pub struct ReceiptExtractor {
    inner: rcpt_core::ReceiptExtractor,
}

#[wasm_bindgen]
impl ReceiptExtractor {
    /// Create an extractor.
    ///
    /// `options` may carry `merchant_keywords` (array of names, checked in
    /// order) and `category_rules` (array of `{keyword, category}`); missing
    /// options keep the built-in lists.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<ReceiptExtractor, JsValue> {
        let config: ExtractionConfig = if options.is_undefined() || options.is_null() {
            ExtractionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(to_js_error)?
        };

        Ok(Self {
            inner: rcpt_core::ReceiptExtractor::with_config(&config),
        })
    }

    /// Extract fields from recognized lines.
    #[wasm_bindgen]
    pub fn extract(&self, lines: JsValue) -> Result<JsValue, JsValue> {
        let lines = lines_from_js(lines)?;
        to_js(&self.inner.extract(&lines))
    }

    /// Extract fields plus warnings describing which fallbacks were used.
    #[wasm_bindgen]
    pub fn explain(&self, lines: JsValue) -> Result<JsValue, JsValue> {
        let lines = lines_from_js(lines)?;
        let result = self.inner.parse(&lines);

        let output = Explained {
            fields: result.fields,
            warnings: result.warnings,
        };

        to_js(&output)
    }
}
