//! Subcommands and the pipeline pieces they share.

pub mod batch;
pub mod config;
pub mod process;
pub mod serve;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use rcpt_core::models::config::{CategorizerConfig, OcrConfig};
use rcpt_core::{HttpCategorizer, LineRecognizer, PureOcrEngine, RcptConfig};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tiff", "tif"];
const LINE_EXTENSIONS: &[&str] = &["txt", "json"];

/// Load `-c` when given, else the user config file if present, else defaults.
pub fn load_config(path: Option<&str>) -> anyhow::Result<RcptConfig> {
    let path = match path {
        Some(path) => Some(PathBuf::from(path)),
        None => Some(config::default_config_path()).filter(|p| p.exists()),
    };

    if let Some(path) = &path {
        debug!("Using config file {}", path.display());
    }

    Ok(RcptConfig::load(path.as_deref())?)
}

/// Build the OCR engine, optionally from a different model directory.
pub fn load_recognizer(config: &OcrConfig, model_dir: Option<&Path>) -> anyhow::Result<PureOcrEngine> {
    let mut config = config.clone();
    if let Some(dir) = model_dir {
        config.model_dir = dir.to_path_buf();
    }

    PureOcrEngine::from_config(&config)
        .with_context(|| format!("Failed to load OCR models from {}", config.model_dir.display()))
}

/// Remote categorizer from config; `force` turns it on regardless.
pub fn build_categorizer(
    config: &CategorizerConfig,
    force: bool,
) -> anyhow::Result<Option<HttpCategorizer>> {
    let mut config = config.clone();
    config.enabled |= force;
    Ok(HttpCategorizer::from_config(&config)?)
}

/// Read already recognized lines: a JSON array for `.json` files, otherwise
/// one line per text line, kept verbatim apart from the line ending.
///
/// Blank lines stay in place: the amount rule looks at the line right after
/// the total label.
pub fn read_lines_file(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if has_extension(path, &["json"]) {
        return serde_json::from_str(&content)
            .with_context(|| format!("{} is not a JSON array of strings", path.display()));
    }

    Ok(content
        .lines()
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect())
}

/// Run OCR on an image file.
pub fn recognize_file(recognizer: &dyn LineRecognizer, path: &Path) -> anyhow::Result<Vec<String>> {
    let image =
        image::open(path).with_context(|| format!("Failed to open image {}", path.display()))?;
    let lines = recognizer.recognize_lines(&image)?;

    debug!("OCR found {} lines in {}", lines.len(), path.display());
    for (i, line) in lines.iter().enumerate() {
        debug!("OCR line {} => {}", i, line);
    }

    Ok(lines)
}

pub fn is_image_file(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS)
}

pub fn is_line_file(path: &Path) -> bool {
    has_extension(path, LINE_EXTENSIONS)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
